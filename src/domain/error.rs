//! Domain-level errors (no I/O concerns)

use thiserror::Error;

/// Errors raised by the christree itself.
///
/// Argument errors are raised before any mutation. Allocation and link
/// errors are raised after the partial work of the failing call has been
/// rolled back.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("allocation failed: {0}")]
    Allocation(String),

    #[error("child array growth failed")]
    Capacity(#[from] std::collections::TryReserveError),

    #[error("link failed: {context}")]
    Link {
        context: String,
        #[source]
        source: Box<TreeError>,
    },

    #[error("invalid depth {depth} for tree of depth {tree_depth}")]
    InvalidDepth { depth: i32, tree_depth: usize },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl TreeError {
    /// Wrap a failed linking step with context.
    pub fn link(context: impl Into<String>, source: TreeError) -> Self {
        Self::Link {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
