//! Audit event types and structures.
//!
//! Events are append-only: they are created, attached to a record, and read
//! back in order. No update or delete operation exists anywhere.

use crate::error::AuditResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    RecordCreated,
    RecordAccessed,
    AccessDenied,
    GrantAdded,
    GrantRevoked,
    RecordSoftDeleted,
    DecryptionFailed,
    KeyRewrapped,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::RecordCreated => "record_created",
            AuditAction::RecordAccessed => "record_accessed",
            AuditAction::AccessDenied => "access_denied",
            AuditAction::GrantAdded => "grant_added",
            AuditAction::GrantRevoked => "grant_revoked",
            AuditAction::RecordSoftDeleted => "record_soft_deleted",
            AuditAction::DecryptionFailed => "decryption_failed",
            AuditAction::KeyRewrapped => "key_rewrapped",
        };
        f.write_str(s)
    }
}

/// How it ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Denied,
    Failure,
}

/// One audit trail entry, keyed by the record it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub record_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor_id: String,
    pub action: AuditAction,
    pub outcome: AuditOutcome,
    /// Opaque request attributes (ip, user agent, rule ids, ...)
    pub context: Value,
}

impl AuditEvent {
    pub fn new(
        record_id: Uuid,
        actor_id: impl Into<String>,
        action: AuditAction,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            record_id,
            timestamp: Utc::now(),
            actor_id: actor_id.into(),
            action,
            outcome,
            context: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Attach any serializable value as the event context
    pub fn with_typed_context<T: Serialize>(mut self, context: &T) -> AuditResult<Self> {
        self.context = serde_json::to_value(context)?;
        Ok(self)
    }

    /// Denied and failed events are the security-relevant ones
    pub fn is_security_event(&self) -> bool {
        matches!(self.outcome, AuditOutcome::Denied | AuditOutcome::Failure)
    }
}
