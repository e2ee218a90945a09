use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DlpError {
    #[error("Rule not found: {0}")]
    RuleNotFound(Uuid),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Rule validation error: {0}")]
    Validation(String),

    #[error("Rule store error: {0}")]
    Store(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DlpResult<T> = Result<T, DlpError>;
