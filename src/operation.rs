//! The operation contract and its handle.

use crate::dtype::DType;
use crate::error::IrError;
use crate::expr::Expr;
use crate::iter_var::IterVar;
use crate::tensor::{Tensor, TensorNode};
use log::debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Contract for a computation that produces one or more tensors.
///
/// This is a purely descriptive surface: a variant enumerates its top-level
/// iteration domain and describes each output, and the actual computation
/// semantics live with the variant. The per-output queries must answer
/// consistently for every `i < num_outputs()`; an implementation that does
/// not is broken, not a recoverable runtime condition.
pub trait OperationNode: std::fmt::Debug {
    /// Display name of the operation.
    fn name(&self) -> &str;

    /// The iteration variables of the operation's root loop nest, in order.
    fn root_iter_vars(&self) -> Vec<IterVar>;

    /// How many tensors this operation produces.
    fn num_outputs(&self) -> usize;

    /// Display name of the i-th output.
    fn output_name(&self, i: usize) -> Result<String, IrError>;

    /// Element type of the i-th output.
    fn output_dtype(&self, i: usize) -> Result<DType, IrError>;

    /// Symbolic shape of the i-th output.
    fn output_shape(&self, i: usize) -> Result<Vec<Expr>, IrError>;
}

/// Handle over an [`OperationNode`].
///
/// Cloning shares the node. Equality and hashing follow node identity,
/// mirroring [`Tensor`].
#[derive(Debug, Clone)]
pub struct Operation(Arc<dyn OperationNode>);

impl Operation {
    pub fn new(node: impl OperationNode + 'static) -> Self {
        Operation(Arc::new(node))
    }

    pub fn from_arc(node: Arc<dyn OperationNode>) -> Self {
        Operation(node)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn root_iter_vars(&self) -> Vec<IterVar> {
        self.0.root_iter_vars()
    }

    pub fn num_outputs(&self) -> usize {
        self.0.num_outputs()
    }

    /// The underlying node.
    pub fn node(&self) -> &dyn OperationNode {
        self.0.as_ref()
    }

    /// The i-th output of this operation as a tensor.
    ///
    /// The returned tensor's node points back at this operation with
    /// `value_index == i`. Identity is stable per `(operation, i)`: every
    /// call yields a tensor that compares and hashes equal to previous ones,
    /// because tensors with a producer are identified by the producer and
    /// the output index rather than by node address.
    pub fn output(&self, i: usize) -> Result<Tensor, IrError> {
        let num_outputs = self.0.num_outputs();
        if i >= num_outputs {
            return Err(IrError::OutputIndex {
                op: self.0.name().to_string(),
                index: i,
                num_outputs,
            });
        }
        debug!("materializing output {i} of operation '{}'", self.0.name());
        let node = TensorNode::new(
            self.0.output_shape(i)?,
            self.0.output_name(i)?,
            self.0.output_dtype(i)?,
            Some(self.clone()),
            i,
        );
        Ok(Tensor::from(node))
    }

    // Trait objects are fat pointers; identity is the data address alone so
    // that vtable duplication across codegen units cannot split one node
    // into two identities.
    fn data_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for Operation {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.data_ptr(), other.data_ptr())
    }
}

impl Eq for Operation {}

impl Hash for Operation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.data_ptr() as usize).hash(state);
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({} outputs)", self.0.name(), self.0.num_outputs())
    }
}
