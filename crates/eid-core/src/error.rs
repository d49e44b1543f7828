use thiserror::Error;

use eid_model::ModelError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no model registered for token: {0}")]
    UnknownModel(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("data source i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ModelError> for CoreError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::UnknownModel(token) => CoreError::UnknownModel(token),
            ModelError::InvalidConfig(msg) => CoreError::InvalidConfig(msg),
            other => CoreError::InvalidConfig(other.to_string()),
        }
    }
}
