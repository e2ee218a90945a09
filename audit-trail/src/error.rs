use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit context serialization failed: {0}")]
    ContextSerialization(#[from] serde_json::Error),
}

pub type AuditResult<T> = Result<T, AuditError>;
