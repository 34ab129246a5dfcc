//! Error types for the chromaprobe engine.

use thiserror::Error;

/// Errors that can occur while updating beliefs, selecting trials, or
/// moving model state in and out of persistence.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// Insufficient data for a severity estimate is deliberately *not* an error:
/// it is reported as [`SeverityEstimate::Unavailable`](crate::metrics::SeverityEstimate).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChromaError {
    /// Malformed color identifier, response string, CVD type, pair key, or
    /// numeric parameter outside its domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A trial that cannot be scored (malformed colors, identical colors, or a
    /// reference that does not sit at its declared position).
    #[error("invalid trial: {0}")]
    InvalidTrial(String),

    /// Unknown selection mode string. The selector swallows this at its
    /// boundary and keeps its current mode.
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// Configuration validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// Snapshot encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Snapshot store failure. Belief updates are never rolled back on this.
    #[error("persistence error: {0}")]
    Persistence(String),
}
