//! Node-level data model of a tensor-expression IR.
//!
//! Dataflow tensors are immutable, reference-counted graph nodes: a tensor
//! is either a free-standing input or the i-th output of a producing
//! operation. This crate fixes the identity and indexing contracts that
//! every later pass (scheduling, lowering, codegen) builds on:
//!
//! - **tensor**: [`TensorNode`], the [`Tensor`] handle, and the [`Slice`]
//!   partial-indexing accumulator
//! - **operation**: the [`OperationNode`] contract and the [`Operation`]
//!   handle
//! - **expr**: symbolic scalar expressions, including the tensor-read node
//! - **dtype**: scalar element types
//! - **iter_var**: iteration-domain variables reported by operations
//! - **node**: generic attribute-visitation and named-callable seams
//! - **error**: the construction-time error taxonomy
//!
//! Handles are cheap to clone and compare by node identity, so they key the
//! memoization maps of downstream passes. The graph is append-only: nodes
//! are fully constructed before a handle is shared, and never mutated after.

pub mod dtype;
pub mod error;
pub mod expr;
pub mod iter_var;
pub mod node;
pub mod operation;
pub mod tensor;

pub use dtype::DType;
pub use error::IrError;
pub use expr::Expr;
pub use iter_var::IterVar;
pub use operation::{Operation, OperationNode};
pub use tensor::{Slice, Tensor, TensorNode};

/// Prelude module with commonly used types and traits.
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::error::IrError;
    pub use crate::expr::Expr;
    pub use crate::iter_var::IterVar;
    pub use crate::node::{AttrValue, AttrVisitor, FunctionNode, VisitAttrs};
    pub use crate::operation::{Operation, OperationNode};
    pub use crate::tensor::{Slice, Tensor, TensorNode};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_compiles() {
        use super::prelude::*;
        let t = Tensor::placeholder(vec![Expr::Const(4)]);
        assert_eq!(t.dtype(), DType::F32);
    }
}
