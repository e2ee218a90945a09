use audit_trail::AuditError;
use crypto_vault::VaultError;
use dlp_engine::{DlpError, RuleAction};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProtectionError {
    /// Malformed input; caller-recoverable and never audited
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not the owner, or no live grant covers the action; always audited
    #[error("Authorization denied: {0}")]
    Authorization(String),

    /// A `block` rule fired; no record was created
    #[error("Submission blocked by DLP rule '{rule_name}' ({rule_id}), action {action:?}")]
    DlpBlocked {
        rule_id: Uuid,
        rule_name: String,
        action: RuleAction,
    },

    /// Same owner and identical content hash on an active record
    #[error("Duplicate content: record {record_id} already holds this payload")]
    DuplicateContent { record_id: Uuid },

    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Crypto(#[from] VaultError),

    #[error(transparent)]
    Dlp(#[from] DlpError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// The only retryable class; surfaced from the store, never generated here
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ProtectionResult<T> = Result<T, ProtectionError>;
