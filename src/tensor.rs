//! Tensor nodes, handles, and the indexing protocol.
//!
//! A [`Tensor`] is a cheap-to-clone handle over an immutable [`TensorNode`].
//! Reading from a tensor with a full set of coordinates produces a symbolic
//! [`Expr::Read`]; reading coordinate by coordinate goes through the
//! ephemeral [`Slice`] accumulator, which collapses to the same read
//! expression once every coordinate has been supplied.

use crate::dtype::DType;
use crate::error::IrError;
use crate::expr::Expr;
use crate::node::{AttrValue, AttrVisitor, FunctionNode, VisitAttrs};
use crate::operation::Operation;
use log::trace;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Not, Rem, Sub};
use std::sync::Arc;

/// The data of one tensor value. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct TensorNode {
    /// Symbolic extent of each dimension; the length is the tensor's rank.
    pub shape: Vec<Expr>,
    /// Display name. Not part of identity.
    pub name: String,
    /// Element type of the tensor's contents.
    pub dtype: DType,
    /// The producing operation, absent for placeholder inputs.
    pub op: Option<Operation>,
    /// Which output of `op` this tensor is. Zero when `op` is absent.
    pub value_index: usize,
}

impl TensorNode {
    pub fn new(
        shape: Vec<Expr>,
        name: impl Into<String>,
        dtype: DType,
        op: Option<Operation>,
        value_index: usize,
    ) -> Self {
        TensorNode {
            shape,
            name: name.into(),
            dtype,
            op,
            value_index,
        }
    }
}

impl VisitAttrs for TensorNode {
    fn visit_attrs(&self, visitor: &mut dyn AttrVisitor) {
        visitor.visit("shape", AttrValue::Exprs(&self.shape));
        visitor.visit("name", AttrValue::Str(&self.name));
        visitor.visit("dtype", AttrValue::DType(&self.dtype));
        visitor.visit("op", AttrValue::Operation(self.op.as_ref()));
        visitor.visit("value_index", AttrValue::Index(self.value_index));
    }
}

impl FunctionNode for TensorNode {
    fn func_name(&self) -> &str {
        &self.name
    }

    fn num_outputs(&self) -> usize {
        1
    }
}

/// Handle over a [`TensorNode`].
///
/// Cloning shares the node; the node lives as long as any handle to it.
/// Equality and hashing follow node identity, not structural value equality,
/// so handles can key maps used for deduplication in downstream passes. A
/// tensor with a producing operation is identified by that operation and its
/// output index, which keeps [`Operation::output`] stable across calls.
#[derive(Debug, Clone)]
pub struct Tensor(Arc<TensorNode>);

impl Tensor {
    /// Creates a free-standing input tensor with the default name and dtype.
    pub fn placeholder(shape: Vec<Expr>) -> Self {
        Self::new(shape, "tensor", DType::default())
    }

    /// Creates a free-standing input tensor.
    ///
    /// Shape legality (e.g. non-negative extents) is not checked here; it is
    /// the expression language's concern.
    pub fn new(shape: Vec<Expr>, name: impl Into<String>, dtype: DType) -> Self {
        let node = TensorNode::new(shape, name, dtype, None, 0);
        trace!(
            "created leaf tensor '{}' rank {} dtype {}",
            node.name,
            node.shape.len(),
            node.dtype
        );
        Tensor(Arc::new(node))
    }

    /// The number of dimensions.
    pub fn ndim(&self) -> usize {
        self.0.shape.len()
    }

    pub fn shape(&self) -> &[Expr] {
        &self.0.shape
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn dtype(&self) -> DType {
        self.0.dtype
    }

    /// The producing operation, if this tensor is a computed value.
    pub fn op(&self) -> Option<&Operation> {
        self.0.op.as_ref()
    }

    /// Output index into the producing operation. Zero for placeholders.
    pub fn value_index(&self) -> usize {
        self.0.value_index
    }

    /// The underlying node.
    pub fn node(&self) -> &TensorNode {
        &self.0
    }

    /// Reads the element at the given coordinates.
    ///
    /// This is the canonical indexing operation: the coordinate count must
    /// equal the rank, and the resulting [`Expr::Read`] is tagged with this
    /// handle so the producing operation and output index stay traceable.
    pub fn call(&self, indices: Vec<Expr>) -> Result<Expr, IrError> {
        if indices.len() != self.ndim() {
            return Err(IrError::RankMismatch {
                name: self.0.name.clone(),
                expected: self.ndim(),
                got: indices.len(),
            });
        }
        trace!("read '{}' at {} coordinates", self.0.name, indices.len());
        Ok(Expr::Read {
            tensor: self.clone(),
            indices,
        })
    }

    /// Begins coordinate-by-coordinate indexing with a first coordinate.
    ///
    /// The returned [`Slice`] borrows this tensor and accumulates further
    /// coordinates via [`Slice::at`]; the rank check happens when the slice
    /// is converted to an expression, so partial slices are legal.
    pub fn at(&self, i: impl Into<Expr>) -> Slice<'_> {
        Slice {
            tensor: self,
            indices: vec![i.into()],
        }
    }
}

impl From<TensorNode> for Tensor {
    fn from(node: TensorNode) -> Self {
        Tensor(Arc::new(node))
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        match (&self.0.op, &other.0.op) {
            (Some(a), Some(b)) => a == b && self.0.value_index == other.0.value_index,
            _ => false,
        }
    }
}

impl Eq for Tensor {}

impl Hash for Tensor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Agrees with `eq`: producer-keyed when a producer exists, node
        // address otherwise.
        match &self.0.op {
            Some(op) => {
                op.hash(state);
                self.0.value_index.hash(state);
            }
            None => (Arc::as_ptr(&self.0) as usize).hash(state),
        }
    }
}

impl std::fmt::Display for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}[", self.0.name, self.0.dtype)?;
        for (n, d) in self.0.shape.iter().enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Partial indexing state: a tensor plus the coordinates applied so far.
///
/// `t.at(i).at(j)` parses chained subscripts one coordinate at a time; once
/// the coordinate count reaches the tensor's rank the slice converts to a
/// read expression. A slice borrows its tensor and is not meant to be
/// stored beyond the expression that builds it.
#[derive(Debug, Clone)]
pub struct Slice<'a> {
    tensor: &'a Tensor,
    indices: Vec<Expr>,
}

impl<'a> Slice<'a> {
    /// Fixes the next coordinate.
    pub fn at(mut self, i: impl Into<Expr>) -> Slice<'a> {
        self.indices.push(i.into());
        self
    }

    /// Coordinates applied so far.
    pub fn indices(&self) -> &[Expr] {
        &self.indices
    }

    /// Collapses the slice into a read expression.
    ///
    /// Fails with [`IrError::RankMismatch`] unless the accumulated
    /// coordinate count equals the tensor's rank.
    pub fn to_expr(&self) -> Result<Expr, IrError> {
        self.tensor.call(self.indices.clone())
    }
}

impl From<Slice<'_>> for Expr {
    /// Panicking form of [`Slice::to_expr`], used by the operator sugar.
    fn from(slice: Slice<'_>) -> Expr {
        match slice.to_expr() {
            Ok(expr) => expr,
            Err(e) => panic!("{e}"),
        }
    }
}

// Slices participate in expression building as if they were already
// converted: each operand is collapsed first, then the Expr operator applies.
// The `Expr (op) Slice` direction is covered by Expr's blanket
// `impl<T: Into<Expr>>` operators.
macro_rules! impl_slice_binary_op {
    ($trait:ident, $fname:ident) => {
        impl<T: Into<Expr>> $trait<T> for Slice<'_> {
            type Output = Expr;
            fn $fname(self, rhs: T) -> Expr {
                Expr::from(self).$fname(rhs.into())
            }
        }
    };
}

impl_slice_binary_op!(Add, add);
impl_slice_binary_op!(Sub, sub);
impl_slice_binary_op!(Mul, mul);
impl_slice_binary_op!(Div, div);
impl_slice_binary_op!(Rem, rem);

impl Neg for Slice<'_> {
    type Output = Expr;

    fn neg(self) -> Expr {
        -Expr::from(self)
    }
}

impl Not for Slice<'_> {
    type Output = Expr;

    fn not(self) -> Expr {
        !Expr::from(self)
    }
}

impl Slice<'_> {
    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        Expr::from(self).lt(rhs)
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        Expr::from(self).eq(rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        Expr::from(self).gt(rhs)
    }

    pub fn and(self, rhs: impl Into<Expr>) -> Expr {
        Expr::from(self).and(rhs)
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Expr {
        Expr::from(self).or(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn matrix(name: &str) -> Tensor {
        Tensor::new(vec![Expr::var("n"), Expr::var("m")], name, DType::F32)
    }

    #[test]
    fn test_placeholder_defaults() {
        let t = Tensor::placeholder(vec![2.into(), 3.into()]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.name(), "tensor");
        assert_eq!(t.dtype(), DType::F32);
        assert!(t.op().is_none());
        assert_eq!(t.value_index(), 0);
    }

    #[test]
    fn test_call_produces_tagged_read() {
        let t = matrix("a");
        let read = t.call(vec![Expr::var("i"), Expr::var("j")]).unwrap();
        match read {
            Expr::Read { tensor, indices } => {
                assert_eq!(tensor, t);
                assert_eq!(indices, vec![Expr::var("i"), Expr::var("j")]);
            }
            other => panic!("expected Read, got {other:?}"),
        }
    }

    #[test]
    fn test_call_is_structurally_repeatable() {
        let t = matrix("a");
        let first = t.call(vec![0.into(), 1.into()]).unwrap();
        let second = t.call(vec![0.into(), 1.into()]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_call_rank_mismatch() {
        let t = matrix("a");
        let err = t.call(vec![0.into(), 1.into(), 2.into()]).unwrap_err();
        assert_eq!(
            err,
            IrError::RankMismatch {
                name: "a".to_string(),
                expected: 2,
                got: 3,
            }
        );
    }

    #[test]
    fn test_chained_slice_equals_call() {
        let t = matrix("a");
        let chained = t.at(Expr::var("i")).at(Expr::var("j")).to_expr().unwrap();
        let direct = t.call(vec![Expr::var("i"), Expr::var("j")]).unwrap();
        assert_eq!(chained, direct);
    }

    #[test]
    fn test_partial_slice_conversion_fails() {
        let t = matrix("a");
        let err = t.at(0).to_expr().unwrap_err();
        assert!(matches!(
            err,
            IrError::RankMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_slice_operators_lift_to_expr() {
        let a = Tensor::new(vec![Expr::var("n")], "a", DType::F32);
        let b = Tensor::new(vec![Expr::var("n")], "b", DType::F32);
        let sum = a.at(Expr::var("i")) + b.at(Expr::var("i"));
        let expected = Expr::Add(
            Box::new(a.call(vec![Expr::var("i")]).unwrap()),
            Box::new(b.call(vec![Expr::var("i")]).unwrap()),
        );
        assert_eq!(sum, expected);

        let neg = -a.at(0);
        assert_eq!(neg, -(a.call(vec![0.into()]).unwrap()));

        let cmp = a.at(0).lt(b.at(0));
        assert!(matches!(cmp, Expr::Lt(_, _)));
    }

    #[test]
    #[should_panic(expected = "rank mismatch")]
    fn test_slice_operator_rank_mismatch_panics() {
        let t = matrix("a");
        let _ = t.at(0) + 1;
    }

    #[test]
    fn test_identity_equality() {
        let a = matrix("a");
        let copy = a.clone();
        assert_eq!(a, copy);

        // Structurally identical but distinct nodes are unequal.
        let twin = matrix("a");
        assert_ne!(a, twin);

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&copy));
        assert!(!set.contains(&twin));
    }

    #[test]
    fn test_visit_attrs_enumerates_all_fields() {
        struct Names(Vec<String>);
        impl AttrVisitor for Names {
            fn visit(&mut self, name: &str, _value: AttrValue<'_>) {
                self.0.push(name.to_string());
            }
        }

        let t = matrix("a");
        let mut names = Names(Vec::new());
        t.node().visit_attrs(&mut names);
        assert_eq!(names.0, ["shape", "name", "dtype", "op", "value_index"]);
    }

    #[test]
    fn test_function_node_surface() {
        let t = matrix("weights");
        assert_eq!(t.node().func_name(), "weights");
        assert_eq!(t.node().num_outputs(), 1);
    }

    #[test]
    fn test_display() {
        let t = matrix("a");
        assert_eq!(t.to_string(), "a: f32[n, m]");
        let read = t.call(vec![Expr::var("i"), 0.into()]).unwrap();
        assert_eq!(read.to_string(), "a[i, 0]");
    }
}
