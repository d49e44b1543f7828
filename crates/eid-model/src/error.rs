use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown model token: {0}")]
    UnknownModel(String),

    #[error("unknown node role: {0}")]
    UnknownRole(String),

    #[error("unknown run mode: {0}")]
    UnknownRunMode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
