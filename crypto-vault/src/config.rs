//! Vault configuration
//!
//! All key material and algorithm selection is carried by an explicit
//! [`VaultConfig`] constructed once and handed to [`crate::CryptoVault::new`].
//! There is no ambient or global key state.

use data_classification::Classification;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Encryption algorithm identifier persisted alongside each sealed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmId {
    /// AES-256 in Galois/Counter Mode (the only supported algorithm)
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
}

impl AlgorithmId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::Aes256Gcm => "AES-256-GCM",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vault configuration
///
/// Carries the initial master key, its id, and the per-classification
/// algorithm registry. A classification with no registry entry cannot be
/// sealed; the default registry covers every level with AES-256-GCM.
pub struct VaultConfig {
    /// Initial master (key-encryption) key, 32 bytes
    pub master_key: [u8; 32],
    /// Identifier of the initial master key, embedded in wrapped keys
    pub master_key_id: u32,
    /// Which algorithm seals payloads of each classification level
    pub algorithms: HashMap<Classification, AlgorithmId>,
}

impl VaultConfig {
    /// Configuration with the given master key and the default registry
    pub fn new(master_key: [u8; 32]) -> Self {
        let algorithms = Classification::ALL
            .iter()
            .map(|c| (*c, AlgorithmId::Aes256Gcm))
            .collect();

        Self {
            master_key,
            master_key_id: 1,
            algorithms,
        }
    }

    pub fn with_master_key_id(mut self, id: u32) -> Self {
        self.master_key_id = id;
        self
    }

    pub fn with_algorithm(mut self, classification: Classification, algorithm: AlgorithmId) -> Self {
        self.algorithms.insert(classification, algorithm);
        self
    }

    /// Restrict sealing to the given classification levels
    pub fn sealing_only(mut self, levels: &[Classification]) -> Self {
        self.algorithms.retain(|c, _| levels.contains(c));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_all_levels() {
        let config = VaultConfig::new([0u8; 32]);
        for level in Classification::ALL {
            assert!(config.algorithms.contains_key(&level));
        }
        assert_eq!(config.master_key_id, 1);
    }

    #[test]
    fn test_sealing_only_restricts_registry() {
        let config = VaultConfig::new([0u8; 32]).sealing_only(&[Classification::Restricted]);
        assert_eq!(config.algorithms.len(), 1);
        assert!(config.algorithms.contains_key(&Classification::Restricted));
    }

    #[test]
    fn test_algorithm_id_serde() {
        let json = serde_json::to_string(&AlgorithmId::Aes256Gcm).unwrap();
        assert_eq!(json, "\"aes-256-gcm\"");
    }
}
