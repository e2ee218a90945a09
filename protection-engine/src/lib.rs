//! Data classification, encryption and DLP policy engine.
//!
//! Decides whether a submitted payload may be stored under a sensitivity
//! classification, encrypts it at rest with tamper-evident cryptography,
//! controls later access through time-bounded grants, and records every
//! decision in an append-only audit trail embedded in the record.
//!
//! The flow: [`ProtectionEngine::submit`] screens the payload against the
//! DLP rule set (a firing `block` rule aborts before any record exists),
//! seals it through the crypto vault, persists a [`ProtectedRecord`] with a
//! computed retention expiry, and appends the creation audit event in the
//! same atomic write. [`ProtectionEngine::retrieve`] authorizes, opens, and
//! audits the access.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use crypto_vault::{Aes256GcmCipher, CryptoVault, VaultConfig};
//! use data_classification::Classification;
//! use dlp_engine::{EvaluationContext, InMemoryRuleStore, RuleEngine};
//! use protection_engine::{EngineConfig, InMemoryRecordStore, ProtectionEngine};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let vault = Arc::new(CryptoVault::new(VaultConfig::new(
//!     Aes256GcmCipher::generate_key(),
//! ))?);
//! let rules = RuleEngine::new(Arc::new(InMemoryRuleStore::new()));
//! let engine = ProtectionEngine::new(
//!     EngineConfig::default(),
//!     vault,
//!     rules,
//!     Arc::new(InMemoryRecordStore::new()),
//! );
//!
//! let ctx = EvaluationContext::new().with_text("department_id", "finance");
//! let receipt = engine
//!     .submit("u1", Classification::Confidential, b"ledger", "report", &ctx)
//!     .await?;
//! let plaintext = engine.retrieve(receipt.record_id, "u1", &ctx).await?;
//! assert_eq!(plaintext, b"ledger");
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod retention;
pub mod store;

pub use config::EngineConfig;
pub use engine::{ProtectionEngine, SubmitReceipt};
pub use error::{ProtectionError, ProtectionResult};
pub use record::{AccessGrant, Permission, ProtectedRecord, RecordSummary};
pub use retention::{compute_expiry, RetentionScheduler, RetentionStatus};
pub use store::{InMemoryRecordStore, Mutation, RecordStore};
