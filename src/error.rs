//! Error types for htmlsieve.

use crate::filter::NodeId;

/// Error type for filter compilation and extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A filter node was reached again while it was still being compiled.
    #[error("Recursive filters detected at node {node}")]
    RecursiveFilter { node: NodeId },

    /// A filter definition is structurally invalid.
    #[error("Invalid filter at {path}: {reason}")]
    InvalidFilter { path: String, reason: String },

    /// A matcher failed while the document was being streamed.
    #[error("Matcher failed: {0}")]
    Matcher(String),
}

/// Result type alias for htmlsieve operations.
pub type Result<T> = std::result::Result<T, Error>;
