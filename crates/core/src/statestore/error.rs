//! Error types for state storage operations.

use thiserror::Error;

/// Errors surfaced by state storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested ticket does not exist.
    #[error("ticket not found: {0}")]
    NotFound(String),

    /// The caller passed something unusable (empty id list, nil assignment).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store could not be reached.
    #[error("state storage unavailable: {0}")]
    Unavailable(String),

    /// Serialization failure or unexpected backend reply.
    #[error("state storage error: {0}")]
    Internal(String),
}
