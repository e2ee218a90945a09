//! Retention expiry computation and reporting.
//!
//! Reaching expiry never auto-purges; purge is an explicit, separately
//! authorized operation outside this engine.

use crate::record::{ProtectedRecord, RecordSummary};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Where a record stands against its retention expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionStatus {
    Active,
    ExpiringSoon,
    Expired,
}

/// Expiry is fixed at creation: created_at + retention period
pub fn compute_expiry(created_at: DateTime<Utc>, retention_period_days: u32) -> DateTime<Utc> {
    created_at + Duration::days(i64::from(retention_period_days))
}

/// Reports retention status against a configurable expiring-soon window
#[derive(Debug, Clone)]
pub struct RetentionScheduler {
    expiring_soon_window: Duration,
}

impl RetentionScheduler {
    pub fn new(expiring_soon_window_days: i64) -> Self {
        Self {
            expiring_soon_window: Duration::days(expiring_soon_window_days),
        }
    }

    pub fn status(&self, record: &ProtectedRecord, now: DateTime<Utc>) -> RetentionStatus {
        self.status_of(record.retention_expiry, now)
    }

    fn status_of(&self, expiry: DateTime<Utc>, now: DateTime<Utc>) -> RetentionStatus {
        if now >= expiry {
            RetentionStatus::Expired
        } else if now + self.expiring_soon_window >= expiry {
            RetentionStatus::ExpiringSoon
        } else {
            RetentionStatus::Active
        }
    }

    /// Active records inside the expiring-soon window, for review sweeps
    pub fn expiring_within<'a>(
        &self,
        summaries: &'a [RecordSummary],
        now: DateTime<Utc>,
    ) -> Vec<&'a RecordSummary> {
        summaries
            .iter()
            .filter(|s| !s.is_deleted)
            .filter(|s| self.status_of(s.retention_expiry, now) == RetentionStatus::ExpiringSoon)
            .collect()
    }
}

impl Default for RetentionScheduler {
    fn default() -> Self {
        Self::new(30)
    }
}
