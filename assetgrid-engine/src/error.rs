//! Error types for the engine layer.

use assetgrid_types::{PropertyKey, RowId};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures reported by the persistence service.
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    /// Network-level failure; the operation may be retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend rejected the payload.
    #[error("rejected by backend: {0}")]
    Validation(String),

    /// The target no longer exists. Treated as success for deletes.
    #[error("target not found")]
    NotFound,
}

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Locally detected bad input. Never reaches the network; the editing
    /// state is retained so the user can correct the draft.
    #[error("type mismatch for '{property}': {input:?}")]
    TypeMismatch { property: String, input: String },

    /// A persistence call failed; the optimistic mutation was rolled back.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The addressed row is not in the current display.
    #[error("row not found: {0}")]
    RowNotFound(RowId),

    /// The addressed column is not in the schema.
    #[error("property not found: {0}")]
    PropertyNotFound(PropertyKey),

    /// A range operation was given an unusable bound.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// The operation is not applicable to the property's kind.
    #[error("operation not supported for property '{0}'")]
    UnsupportedKind(PropertyKey),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
