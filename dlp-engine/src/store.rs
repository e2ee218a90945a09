//! Rule persistence.
//!
//! Every mutation happens inside a single write-lock critical section, so
//! concurrent trigger recording never loses an increment and version bumps
//! are strictly sequential.

use crate::error::{DlpError, DlpResult};
use crate::rule::{DlpRule, RuleAction, RulePatch};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage backend for DLP rules
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Persist a new rule; the stored version is always 1
    async fn insert(&self, rule: DlpRule) -> DlpResult<DlpRule>;

    async fn get(&self, id: Uuid) -> DlpResult<DlpRule>;

    async fn list(&self) -> DlpResult<Vec<DlpRule>>;

    /// Apply a patch atomically, bumping the version by exactly 1
    async fn update(&self, id: Uuid, patch: RulePatch) -> DlpResult<DlpRule>;

    /// Atomically count one firing of the rule
    async fn record_trigger(&self, id: Uuid, action: RuleAction) -> DlpResult<()>;

    async fn delete(&self, id: Uuid) -> DlpResult<()>;
}

/// In-memory rule store for development and testing
pub struct InMemoryRuleStore {
    rules: RwLock<HashMap<Uuid, DlpRule>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRuleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn insert(&self, mut rule: DlpRule) -> DlpResult<DlpRule> {
        rule.validate()?;
        rule.version = 1;

        let mut rules = self.rules.write().await;
        if rules.contains_key(&rule.id) {
            return Err(DlpError::Validation(format!(
                "rule {} already exists",
                rule.id
            )));
        }
        rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn get(&self, id: Uuid) -> DlpResult<DlpRule> {
        self.rules
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DlpError::RuleNotFound(id))
    }

    async fn list(&self) -> DlpResult<Vec<DlpRule>> {
        Ok(self.rules.read().await.values().cloned().collect())
    }

    async fn update(&self, id: Uuid, patch: RulePatch) -> DlpResult<DlpRule> {
        let mut rules = self.rules.write().await;
        let rule = rules.get_mut(&id).ok_or(DlpError::RuleNotFound(id))?;

        let mut next = rule.clone();
        patch.apply_to(&mut next, Utc::now());
        next.validate()?;
        *rule = next;
        Ok(rule.clone())
    }

    async fn record_trigger(&self, id: Uuid, action: RuleAction) -> DlpResult<()> {
        let mut rules = self.rules.write().await;
        let rule = rules.get_mut(&id).ok_or(DlpError::RuleNotFound(id))?;
        rule.statistics.record(action, Utc::now());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DlpResult<()> {
        self.rules
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(DlpError::RuleNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{PatternType, Severity};
    use std::sync::Arc;

    fn sample_rule() -> DlpRule {
        DlpRule::new("card block", PatternType::CreditCard, "", RuleAction::Block)
            .with_severity(Severity::High)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryRuleStore::new();
        let rule = store.insert(sample_rule()).await.unwrap();
        assert_eq!(rule.version, 1);

        let loaded = store.get(rule.id).await.unwrap();
        assert_eq!(loaded.name, "card block");
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryRuleStore::new();
        let rule = store.insert(sample_rule()).await.unwrap();
        assert!(store.insert(rule).await.is_err());
    }

    #[tokio::test]
    async fn test_version_monotonicity() {
        let store = InMemoryRuleStore::new();
        let rule = store.insert(sample_rule()).await.unwrap();

        // After n updates, version == n + 1 (creation write is version 1)
        for n in 0..5u64 {
            let updated = store
                .update(
                    rule.id,
                    RulePatch {
                        enabled: Some(n % 2 == 0),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            assert_eq!(updated.version, n + 2);
        }
    }

    #[tokio::test]
    async fn test_update_rejecting_invalid_patch_leaves_rule_untouched() {
        let store = InMemoryRuleStore::new();
        let rule = store
            .insert(DlpRule::new("re", PatternType::Regex, r"\d+", RuleAction::Log))
            .await
            .unwrap();

        let result = store
            .update(
                rule.id,
                RulePatch {
                    pattern: Some(r"([".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_err());

        let loaded = store.get(rule.id).await.unwrap();
        assert_eq!(loaded.pattern, r"\d+");
        assert_eq!(loaded.version, 1);
    }

    #[tokio::test]
    async fn test_concurrent_triggers_all_counted() {
        let store = Arc::new(InMemoryRuleStore::new());
        let rule = store.insert(sample_rule()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let id = rule.id;
            handles.push(tokio::spawn(async move {
                store.record_trigger(id, RuleAction::Block).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let loaded = store.get(rule.id).await.unwrap();
        assert_eq!(loaded.statistics.total_matches, 16);
        assert_eq!(loaded.statistics.blocked_count, 16);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryRuleStore::new();
        let rule = store.insert(sample_rule()).await.unwrap();
        store.delete(rule.id).await.unwrap();
        assert!(matches!(
            store.get(rule.id).await,
            Err(DlpError::RuleNotFound(_))
        ));
        assert!(store.delete(rule.id).await.is_err());
    }
}
