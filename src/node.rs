//! Generic node traversal seams.
//!
//! Node types expose their fields to an [`AttrVisitor`] so that printing,
//! serialization, and structural inspection can be written once against the
//! visitor instead of once per node type. [`FunctionNode`] is the minimal
//! "named callable with an output arity" surface the expression machinery
//! needs from a node.

use crate::dtype::DType;
use crate::expr::Expr;
use crate::operation::Operation;

/// A borrowed view of one node field, passed to [`AttrVisitor::visit`].
#[derive(Debug, Clone, Copy)]
pub enum AttrValue<'a> {
    Exprs(&'a [Expr]),
    Str(&'a str),
    DType(&'a DType),
    Operation(Option<&'a Operation>),
    Index(usize),
}

/// Receives one callback per field of a visited node.
pub trait AttrVisitor {
    fn visit(&mut self, name: &str, value: AttrValue<'_>);
}

/// Implemented by node types to enumerate their fields.
pub trait VisitAttrs {
    fn visit_attrs(&self, visitor: &mut dyn AttrVisitor);
}

/// A node that behaves as a named callable producing some number of values.
pub trait FunctionNode {
    /// Display name of the callable.
    fn func_name(&self) -> &str;
    /// Number of values the callable produces.
    fn num_outputs(&self) -> usize;
}
