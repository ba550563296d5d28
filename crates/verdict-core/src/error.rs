use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),

    #[error("evidence store error: {0}")]
    Evidence(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type VerdictResult<T> = Result<T, VerdictError>;
