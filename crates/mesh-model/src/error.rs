use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("decode failure: {0}")]
    Decode(String),

    #[error("unknown resource kind: {0}")]
    UnknownResourceKind(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("unknown restart strategy: {0}")]
    UnknownRestart(String),

    #[error("unknown jitter strategy: {0}")]
    UnknownJitter(String),

    #[error("invalid id '{id}': {reason}")]
    InvalidId { id: String, reason: String },
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        ModelError::Decode(e.to_string())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
