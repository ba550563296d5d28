//! Error types for the decision merge engine and policy pack loading.

use thiserror::Error;

/// Errors surfaced while configuring the engine or loading policy packs.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Pack or configuration content failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Pack bytes could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Pack bytes were rejected before decoding was attempted.
    #[error("pack load failed: {0}")]
    PackLoad(String),

    /// Pack content could not be encoded for storage.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The pack store itself failed.
    #[error("pack store failure: {0}")]
    Store(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Deserialization(err.to_string())
    }
}

/// Convenience alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
