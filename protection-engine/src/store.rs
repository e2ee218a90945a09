//! Record persistence.
//!
//! Mutations go through [`RecordStore::update`]: the mutator runs against a
//! copy under the write lock and commits only on success, so a failing
//! mutator leaves the document untouched and concurrent updates are applied
//! one after another with no lost writes. Audit events are appended by the
//! same mutator as the state change they document.

use crate::error::{ProtectionError, ProtectionResult};
use crate::record::{ProtectedRecord, RecordSummary};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Atomic read-modify-write applied to a single record
pub type Mutation = Box<dyn FnOnce(&mut ProtectedRecord) -> ProtectionResult<()> + Send>;

/// Storage backend for protected records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, rejecting duplicates by owner + content hash
    ///
    /// The duplicate check and the insert happen in one critical section, so
    /// two concurrent identical submissions cannot both land.
    async fn insert_unique(&self, record: ProtectedRecord) -> ProtectionResult<()>;

    async fn get(&self, id: Uuid) -> ProtectionResult<ProtectedRecord>;

    /// Apply a mutation atomically and return the updated record
    async fn update(&self, id: Uuid, mutation: Mutation) -> ProtectionResult<ProtectedRecord>;

    /// Metadata-only listing; never exposes ciphertext or wrapped keys
    async fn list_by_owner(&self, owner_id: &str) -> ProtectionResult<Vec<RecordSummary>>;

    async fn all_ids(&self) -> ProtectionResult<Vec<Uuid>>;
}

/// In-memory record store for development and testing
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<Uuid, ProtectedRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_unique(&self, record: ProtectedRecord) -> ProtectionResult<()> {
        let mut records = self.records.write().await;

        if let Some(existing) = records.values().find(|r| {
            r.owner_id == record.owner_id
                && r.integrity_hash == record.integrity_hash
                && !r.is_deleted
        }) {
            return Err(ProtectionError::DuplicateContent {
                record_id: existing.id,
            });
        }

        records.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> ProtectionResult<ProtectedRecord> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ProtectionError::NotFound(id))
    }

    async fn update(&self, id: Uuid, mutation: Mutation) -> ProtectionResult<ProtectedRecord> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(ProtectionError::NotFound(id))?;

        let mut next = record.clone();
        mutation(&mut next)?;
        *record = next;
        Ok(record.clone())
    }

    async fn list_by_owner(&self, owner_id: &str) -> ProtectionResult<Vec<RecordSummary>> {
        let records = self.records.read().await;
        let mut summaries: Vec<RecordSummary> = records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .map(ProtectedRecord::summary)
            .collect();
        summaries.sort_by_key(|s| s.created_at);
        Ok(summaries)
    }

    async fn all_ids(&self) -> ProtectionResult<Vec<Uuid>> {
        Ok(self.records.read().await.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access;
    use crate::record::Permission;
    use chrono::Utc;
    use crypto_vault::{AlgorithmId, SealedPayload};
    use data_classification::Classification;
    use std::sync::Arc;

    fn record(owner: &str, hash: &str) -> ProtectedRecord {
        ProtectedRecord::new(
            owner,
            "document",
            Classification::Internal,
            SealedPayload {
                ciphertext: b"nonce:ct".to_vec(),
                wrapped_key: "mk1:nonce:wrapped".to_string(),
                algorithm_id: AlgorithmId::Aes256Gcm,
                integrity_hash: hash.to_string(),
            },
            30,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryRecordStore::new();
        let rec = record("u1", "h1");
        let id = rec.id;
        store.insert_unique(rec).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().owner_id, "u1");
    }

    #[tokio::test]
    async fn test_duplicate_content_rejected_per_owner() {
        let store = InMemoryRecordStore::new();
        let first = record("u1", "same-hash");
        let first_id = first.id;
        store.insert_unique(first).await.unwrap();

        let err = store.insert_unique(record("u1", "same-hash")).await;
        assert!(matches!(
            err,
            Err(ProtectionError::DuplicateContent { record_id }) if record_id == first_id
        ));

        // A different owner may store identical content
        store.insert_unique(record("u2", "same-hash")).await.unwrap();
    }

    #[tokio::test]
    async fn test_soft_deleted_record_frees_the_hash() {
        let store = InMemoryRecordStore::new();
        let mut rec = record("u1", "h");
        rec.is_deleted = true;
        store.insert_unique(rec).await.unwrap();

        store.insert_unique(record("u1", "h")).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_record_untouched() {
        let store = InMemoryRecordStore::new();
        let rec = record("u1", "h");
        let id = rec.id;
        store.insert_unique(rec).await.unwrap();

        let result = store
            .update(
                id,
                Box::new(|rec| {
                    rec.is_deleted = true;
                    Err(ProtectionError::Validation("abort".to_string()))
                }),
            )
            .await;
        assert!(result.is_err());
        assert!(!store.get(id).await.unwrap().is_deleted);
    }

    #[tokio::test]
    async fn test_concurrent_grants_both_survive() {
        let store = Arc::new(InMemoryRecordStore::new());
        let rec = record("owner", "h");
        let id = rec.id;
        store.insert_unique(rec).await.unwrap();

        let grant_to = |grantee: &'static str| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(
                        id,
                        Box::new(move |rec| {
                            access::grant(
                                rec,
                                grantee,
                                &[Permission::Read],
                                "owner",
                                None,
                                Utc::now(),
                            )
                        }),
                    )
                    .await
            })
        };

        let (a, b) = tokio::join!(grant_to("u2"), grant_to("u3"));
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let loaded = store.get(id).await.unwrap();
        assert_eq!(loaded.grants.len(), 2);
    }

    #[tokio::test]
    async fn test_list_by_owner_is_summary_only_and_ordered() {
        let store = InMemoryRecordStore::new();
        store.insert_unique(record("u1", "h1")).await.unwrap();
        store.insert_unique(record("u1", "h2")).await.unwrap();
        store.insert_unique(record("u2", "h3")).await.unwrap();

        let summaries = store.list_by_owner("u1").await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].created_at <= summaries[1].created_at);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = InMemoryRecordStore::new();
        let result = store.update(Uuid::new_v4(), Box::new(|_| Ok(()))).await;
        assert!(matches!(result, Err(ProtectionError::NotFound(_))));
    }
}
