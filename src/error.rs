//! Error types for the recommendation engine.
//!
//! Uses `thiserror` for `Display` and `Error` implementations. Numeric edge
//! cases (zero-magnitude vectors, empty token sets) are never reported here;
//! they resolve to zero scores inside the scoring layer.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, RecommendError>;

/// Error kinds surfaced by the recommendation engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecommendError {
    /// A query was issued before any model was built and auto-init is disabled
    #[error("recommendation model has not been initialized")]
    NotInitialized,

    /// The named reference slug has no vector in the current model
    #[error("unknown reference document: {0}")]
    UnknownReference(String),

    /// A caller-supplied argument failed validation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
