//! Error types for graph construction.

use thiserror::Error;

/// Errors raised while building IR nodes.
///
/// All of these are caller errors detected synchronously at the offending
/// call. Nodes are immutable once constructed, so a failed call never leaves
/// partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// The number of supplied coordinates differs from the tensor's rank.
    #[error("rank mismatch indexing tensor '{name}': expected {expected} indices, got {got}")]
    RankMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// An output index addresses a non-existent output of an operation.
    #[error("output index {index} out of range for operation '{op}' with {num_outputs} outputs")]
    OutputIndex {
        op: String,
        index: usize,
        num_outputs: usize,
    },
}
