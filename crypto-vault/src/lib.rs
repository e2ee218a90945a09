//! Authenticated encryption at rest for protected records.
//!
//! This crate provides the cryptographic core of the engine:
//! - AES-256-GCM authenticated encryption with a fresh nonce per seal
//! - per-record data-encryption keys wrapped under versioned master keys
//! - SHA-256 pre-encryption content hashing for dedup and tamper evidence
//! - master-key rotation that never blocks concurrent readers
//!
//! All key material lives in an explicit [`VaultConfig`]; there is no global
//! state, and keys are zeroized on drop.

pub mod aead;
pub mod config;
pub mod error;
pub mod vault;

pub use aead::Aes256GcmCipher;
pub use config::{AlgorithmId, VaultConfig};
pub use error::{VaultError, VaultResult};
pub use vault::{CryptoVault, SealedPayload};
