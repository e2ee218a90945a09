//! The protected record document and its embedded grant list.

use crate::retention;
use audit_trail::AuditEvent;
use chrono::{DateTime, Utc};
use crypto_vault::{AlgorithmId, SealedPayload};
use data_classification::Classification;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a grant permits its grantee to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Delete,
    Share,
}

/// A time-bounded authorization for a non-owner actor
///
/// Multiple grants for the same grantee coexist and are evaluated
/// independently. The owner is implicit and never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    pub grantee_id: String,
    pub permissions: Vec<Permission>,
    pub granted_by: String,
    pub granted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessGrant {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether this grant covers the permission right now
    pub fn allows(&self, permission: Permission, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && self.permissions.contains(&permission)
    }
}

/// An encrypted payload at rest with its grants and audit history
///
/// Ciphertext, integrity hash, and classification are immutable after
/// creation; re-encryption means a new record and a soft delete of this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub data_type: String,
    pub classification: Classification,
    pub ciphertext: Vec<u8>,
    /// Per-record key wrapped under a master key; never exposed in listings
    pub wrapped_key: String,
    pub algorithm_id: AlgorithmId,
    /// SHA-256 hex of the plaintext, computed before encryption
    pub integrity_hash: String,
    pub retention_period_days: u32,
    /// created_at + retention period, computed once and immutable
    pub retention_expiry: DateTime<Utc>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub grants: Vec<AccessGrant>,
    pub audit_log: Vec<AuditEvent>,
}

impl ProtectedRecord {
    pub fn new(
        owner_id: impl Into<String>,
        data_type: impl Into<String>,
        classification: Classification,
        sealed: SealedPayload,
        retention_period_days: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            data_type: data_type.into(),
            classification,
            ciphertext: sealed.ciphertext,
            wrapped_key: sealed.wrapped_key,
            algorithm_id: sealed.algorithm_id,
            integrity_hash: sealed.integrity_hash,
            retention_period_days,
            retention_expiry: retention::compute_expiry(now, retention_period_days),
            is_deleted: false,
            created_at: now,
            updated_at: now,
            grants: Vec::new(),
            audit_log: Vec::new(),
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Listing view; carries no key material or ciphertext
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id,
            owner_id: self.owner_id.clone(),
            data_type: self.data_type.clone(),
            classification: self.classification,
            algorithm_id: self.algorithm_id,
            integrity_hash: self.integrity_hash.clone(),
            retention_expiry: self.retention_expiry,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
            grant_count: self.grants.len(),
        }
    }
}

/// Metadata-only view of a record used by listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: Uuid,
    pub owner_id: String,
    pub data_type: String,
    pub classification: Classification,
    pub algorithm_id: AlgorithmId,
    pub integrity_hash: String,
    pub retention_expiry: DateTime<Utc>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub grant_count: usize,
}
