//! The protection engine facade.
//!
//! Ties the components together: DLP screening before anything is stored,
//! sealing on success, grant-governed retrieval, and an audit event inside
//! every record mutation. Denied and failed outcomes are audited as
//! security events; validation failures are not.

use crate::access;
use crate::config::EngineConfig;
use crate::error::{ProtectionError, ProtectionResult};
use crate::record::{Permission, ProtectedRecord, RecordSummary};
use crate::retention::{RetentionScheduler, RetentionStatus};
use crate::store::RecordStore;
use audit_trail::{AuditAction, AuditEvent, AuditOutcome, AuditTrail};
use chrono::{DateTime, Utc};
use crypto_vault::CryptoVault;
use data_classification::Classification;
use dlp_engine::{EvaluationContext, RuleEngine, RulePreview};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// What a successful submission returns
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub record_id: Uuid,
    pub retention_expiry: DateTime<Utc>,
}

/// Data classification, encryption and DLP policy engine
pub struct ProtectionEngine {
    config: EngineConfig,
    vault: Arc<CryptoVault>,
    rules: RuleEngine,
    records: Arc<dyn RecordStore>,
    scheduler: RetentionScheduler,
}

impl ProtectionEngine {
    pub fn new(
        config: EngineConfig,
        vault: Arc<CryptoVault>,
        rules: RuleEngine,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        let scheduler = RetentionScheduler::new(config.expiring_soon_window_days);
        Self {
            config,
            vault,
            rules,
            records,
            scheduler,
        }
    }

    /// Rule engine handle for administrative rule management
    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn scheduler(&self) -> &RetentionScheduler {
        &self.scheduler
    }

    /// Screen, seal and store a payload
    ///
    /// A firing `block` rule aborts the call before any record exists; the
    /// rule's statistics still count the firing. Duplicate content (same
    /// owner, same content hash, record still active) is rejected.
    pub async fn submit(
        &self,
        owner_id: &str,
        classification: Classification,
        plaintext: &[u8],
        data_type: &str,
        context: &EvaluationContext,
    ) -> ProtectionResult<SubmitReceipt> {
        if owner_id.trim().is_empty() {
            return Err(ProtectionError::Validation("owner id cannot be empty".to_string()));
        }
        if data_type.trim().is_empty() {
            return Err(ProtectionError::Validation("data type cannot be empty".to_string()));
        }
        if plaintext.is_empty() {
            return Err(ProtectionError::Validation("plaintext cannot be empty".to_string()));
        }

        // Seed the identity fields scoped rules key on
        let ctx = context
            .clone()
            .with_text("user_id", owner_id)
            .with_text("data_type", data_type);

        let content = String::from_utf8_lossy(plaintext);
        let evaluation = self.rules.evaluate(&content, &ctx, classification).await?;

        if let Some(blocking) = evaluation.blocking_rule() {
            warn!(
                rule = %blocking.rule_name,
                rule_id = %blocking.rule_id,
                owner = owner_id,
                "submission blocked by DLP rule"
            );
            return Err(ProtectionError::DlpBlocked {
                rule_id: blocking.rule_id,
                rule_name: blocking.rule_name.clone(),
                action: blocking.action,
            });
        }

        let sealed = self.vault.seal(plaintext, classification)?;
        let retention_days = self.config.retention_days_for(classification);
        let mut record =
            ProtectedRecord::new(owner_id, data_type, classification, sealed, retention_days);

        record.audit_log.push(
            AuditEvent::new(record.id, owner_id, AuditAction::RecordCreated, AuditOutcome::Success)
                .with_context(json!({
                    "classification": classification,
                    "data_type": data_type,
                    "dlp_rules_fired": evaluation.matched_rules.len(),
                })),
        );

        let receipt = SubmitReceipt {
            record_id: record.id,
            retention_expiry: record.retention_expiry,
        };
        self.records.insert_unique(record).await?;

        info!(record_id = %receipt.record_id, %classification, "record created");
        Ok(receipt)
    }

    /// Authorize, open, and audit a read
    pub async fn retrieve(
        &self,
        record_id: Uuid,
        actor_id: &str,
        context: &EvaluationContext,
    ) -> ProtectionResult<Vec<u8>> {
        let record = self.records.get(record_id).await?;
        if record.is_deleted {
            return Err(ProtectionError::NotFound(record_id));
        }

        let now = Utc::now();
        if !access::authorize(&record, actor_id, Permission::Read, now) {
            self.append_denial(record_id, actor_id, json!({"permission": "read"}), context)
                .await?;
            return Err(ProtectionError::Authorization(format!(
                "{actor_id} may not read record {record_id}"
            )));
        }

        match self
            .vault
            .open(&record.ciphertext, &record.wrapped_key, record.algorithm_id)
        {
            Ok(plaintext) => {
                let event = AuditEvent::new(
                    record_id,
                    actor_id,
                    AuditAction::RecordAccessed,
                    AuditOutcome::Success,
                )
                .with_typed_context(context)?;
                self.records
                    .update(
                        record_id,
                        Box::new(move |rec| {
                            rec.audit_log.push(event);
                            rec.touch(now);
                            Ok(())
                        }),
                    )
                    .await?;
                Ok(plaintext)
            }
            Err(err) => {
                // Tamper or corruption; fatal for this read, never retried
                warn!(record_id = %record_id, %err, "decryption failed");
                let event = AuditEvent::new(
                    record_id,
                    actor_id,
                    AuditAction::DecryptionFailed,
                    AuditOutcome::Failure,
                )
                .with_context(json!({"error": err.to_string()}));
                self.records
                    .update(
                        record_id,
                        Box::new(move |rec| {
                            rec.audit_log.push(event);
                            Ok(())
                        }),
                    )
                    .await?;
                Err(ProtectionError::Crypto(err))
            }
        }
    }

    /// Add a time-bounded grant; owner-only
    pub async fn share(
        &self,
        record_id: Uuid,
        owner_id: &str,
        grantee_id: &str,
        permissions: &[Permission],
        expires_at: Option<DateTime<Utc>>,
    ) -> ProtectionResult<()> {
        let now = Utc::now();
        let owner = owner_id.to_string();
        let grantee = grantee_id.to_string();
        let perms = permissions.to_vec();

        let result = self
            .records
            .update(
                record_id,
                Box::new(move |rec| {
                    if rec.is_deleted {
                        return Err(ProtectionError::NotFound(rec.id));
                    }
                    access::grant(rec, &grantee, &perms, &owner, expires_at, now)?;
                    rec.audit_log.push(
                        AuditEvent::new(rec.id, owner.as_str(), AuditAction::GrantAdded, AuditOutcome::Success)
                            .with_context(json!({
                                "grantee_id": grantee,
                                "permissions": perms,
                                "expires_at": expires_at,
                            })),
                    );
                    rec.touch(now);
                    Ok(())
                }),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(ProtectionError::Authorization(msg)) => {
                self.append_denial(
                    record_id,
                    owner_id,
                    json!({"operation": "share", "grantee_id": grantee_id}),
                    &EvaluationContext::new(),
                )
                .await?;
                Err(ProtectionError::Authorization(msg))
            }
            Err(err) => Err(err),
        }
    }

    /// Remove every grant for a grantee; owner-only, idempotent
    pub async fn revoke(
        &self,
        record_id: Uuid,
        owner_id: &str,
        grantee_id: &str,
    ) -> ProtectionResult<()> {
        let now = Utc::now();
        let owner = owner_id.to_string();
        let grantee = grantee_id.to_string();

        let result = self
            .records
            .update(
                record_id,
                Box::new(move |rec| {
                    if rec.is_deleted {
                        return Err(ProtectionError::NotFound(rec.id));
                    }
                    let removed = access::revoke(rec, &owner, &grantee)?;
                    rec.audit_log.push(
                        AuditEvent::new(rec.id, owner.as_str(), AuditAction::GrantRevoked, AuditOutcome::Success)
                            .with_context(json!({
                                "grantee_id": grantee,
                                "grants_removed": removed,
                            })),
                    );
                    rec.touch(now);
                    Ok(())
                }),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(ProtectionError::Authorization(msg)) => {
                self.append_denial(
                    record_id,
                    owner_id,
                    json!({"operation": "revoke", "grantee_id": grantee_id}),
                    &EvaluationContext::new(),
                )
                .await?;
                Err(ProtectionError::Authorization(msg))
            }
            Err(err) => Err(err),
        }
    }

    /// Mark a record deleted; requires the `delete` permission
    pub async fn soft_delete(&self, record_id: Uuid, actor_id: &str) -> ProtectionResult<()> {
        let now = Utc::now();
        let actor = actor_id.to_string();

        let result = self
            .records
            .update(
                record_id,
                Box::new(move |rec| {
                    if rec.is_deleted {
                        return Err(ProtectionError::NotFound(rec.id));
                    }
                    if !access::authorize(rec, &actor, Permission::Delete, now) {
                        return Err(ProtectionError::Authorization(format!(
                            "{actor} may not delete record {}",
                            rec.id
                        )));
                    }
                    rec.is_deleted = true;
                    rec.audit_log.push(AuditEvent::new(
                        rec.id,
                        actor.as_str(),
                        AuditAction::RecordSoftDeleted,
                        AuditOutcome::Success,
                    ));
                    rec.touch(now);
                    Ok(())
                }),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(ProtectionError::Authorization(msg)) => {
                self.append_denial(
                    record_id,
                    actor_id,
                    json!({"operation": "soft_delete"}),
                    &EvaluationContext::new(),
                )
                .await?;
                Err(ProtectionError::Authorization(msg))
            }
            Err(err) => Err(err),
        }
    }

    /// Dry-run a stored rule against a sample; never touches statistics
    pub async fn preview_rule(
        &self,
        rule_id: Uuid,
        sample: &str,
        context: &EvaluationContext,
    ) -> ProtectionResult<RulePreview> {
        let rule = self.rules.store().get(rule_id).await?;
        Ok(self.rules.test_rule(&rule, sample, context))
    }

    /// Chronological audit history of a record, deleted ones included
    pub async fn audit_trail(&self, record_id: Uuid) -> ProtectionResult<Vec<AuditEvent>> {
        let record = self.records.get(record_id).await?;
        Ok(AuditTrail::new(&record.audit_log).chronological())
    }

    /// Retention standing of a record right now
    pub async fn retention_status(&self, record_id: Uuid) -> ProtectionResult<RetentionStatus> {
        let record = self.records.get(record_id).await?;
        Ok(self.scheduler.status(&record, Utc::now()))
    }

    /// Metadata-only listing of an owner's records
    pub async fn list_records(&self, owner_id: &str) -> ProtectionResult<Vec<RecordSummary>> {
        self.records.list_by_owner(owner_id).await
    }

    /// Rotate the master key and re-wrap every stored record key
    ///
    /// Ciphertext is untouched; readers keep working throughout because the
    /// vault resolves wrapped keys by master key id.
    pub async fn rotate_master_key(&self) -> ProtectionResult<u32> {
        let new_id = self.vault.rotate_master_key()?;
        let ids = self.records.all_ids().await?;
        let count = ids.len();

        for record_id in ids {
            let vault = Arc::clone(&self.vault);
            self.records
                .update(
                    record_id,
                    Box::new(move |rec| {
                        let rewrapped = vault.rewrap_key(&rec.wrapped_key)?;
                        if rewrapped != rec.wrapped_key {
                            rec.wrapped_key = rewrapped;
                            rec.audit_log.push(
                                AuditEvent::new(
                                    rec.id,
                                    "system",
                                    AuditAction::KeyRewrapped,
                                    AuditOutcome::Success,
                                )
                                .with_context(json!({"master_key_id": new_id})),
                            );
                            rec.touch(Utc::now());
                        }
                        Ok(())
                    }),
                )
                .await?;
        }

        info!(master_key_id = new_id, records = count, "master key rotated");
        Ok(new_id)
    }

    /// Append a denial event; the denial itself is the audited state change
    async fn append_denial(
        &self,
        record_id: Uuid,
        actor_id: &str,
        detail: serde_json::Value,
        context: &EvaluationContext,
    ) -> ProtectionResult<()> {
        let request = serde_json::to_value(context)?;
        let event = AuditEvent::new(record_id, actor_id, AuditAction::AccessDenied, AuditOutcome::Denied)
            .with_context(json!({"detail": detail, "request": request}));

        self.records
            .update(
                record_id,
                Box::new(move |rec| {
                    rec.audit_log.push(event);
                    Ok(())
                }),
            )
            .await?;
        Ok(())
    }
}
