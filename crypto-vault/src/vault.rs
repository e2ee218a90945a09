//! The vault: seal/open protected payloads and rotate master keys.
//!
//! Sealing follows the envelope pattern:
//! 1. generate a random per-record data-encryption key (DEK)
//! 2. encrypt the payload with the DEK under AES-256-GCM, fresh nonce per call
//! 3. wrap the DEK under the active master key (KEK)
//! 4. hash the plaintext before encryption for dedup and tamper evidence
//!
//! Wrapped keys carry the master key id (`mk{id}:...`), so after a rotation
//! old and new master keys coexist and readers are never blocked.

use crate::aead::Aes256GcmCipher;
use crate::config::{AlgorithmId, VaultConfig};
use crate::error::{VaultError, VaultResult};
use data_classification::Classification;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Output of a successful seal
#[derive(Debug, Clone)]
pub struct SealedPayload {
    /// Nonce-framed AES-GCM ciphertext
    pub ciphertext: Vec<u8>,
    /// DEK wrapped under a master key, `mk{id}:{nonce_b64}:{wrapped_b64}`
    pub wrapped_key: String,
    /// Algorithm that sealed the payload
    pub algorithm_id: AlgorithmId,
    /// SHA-256 hex of the plaintext, computed before encryption
    pub integrity_hash: String,
}

/// Authenticated encryption vault with versioned master keys
pub struct CryptoVault {
    /// Master keys by id; old keys stay resident for reads after rotation
    keys: RwLock<HashMap<u32, Aes256GcmCipher>>,
    active_key_id: AtomicU32,
    algorithms: HashMap<Classification, AlgorithmId>,
}

impl CryptoVault {
    pub fn new(config: VaultConfig) -> VaultResult<Self> {
        let mut keys = HashMap::new();
        keys.insert(config.master_key_id, Aes256GcmCipher::new(config.master_key)?);

        Ok(Self {
            keys: RwLock::new(keys),
            active_key_id: AtomicU32::new(config.master_key_id),
            algorithms: config.algorithms,
        })
    }

    /// Id of the master key new seals are wrapped under
    pub fn active_key_id(&self) -> u32 {
        self.active_key_id.load(Ordering::Relaxed)
    }

    /// SHA-256 hex digest of a payload
    pub fn content_hash(plaintext: &[u8]) -> String {
        hex::encode(Sha256::digest(plaintext))
    }

    /// Seal a payload under a fresh per-record key
    pub fn seal(&self, plaintext: &[u8], classification: Classification) -> VaultResult<SealedPayload> {
        if plaintext.is_empty() {
            return Err(VaultError::EmptyPlaintext);
        }
        let algorithm_id = self
            .algorithms
            .get(&classification)
            .copied()
            .ok_or(VaultError::UnsupportedClassification(classification))?;

        let integrity_hash = Self::content_hash(plaintext);

        let dek_cipher = Aes256GcmCipher::new(Aes256GcmCipher::generate_key())?;
        let ciphertext = match algorithm_id {
            AlgorithmId::Aes256Gcm => dek_cipher.encrypt(plaintext)?.into_bytes(),
        };

        let wrapped_key = self.wrap_dek(dek_cipher.key_bytes())?;

        Ok(SealedPayload {
            ciphertext,
            wrapped_key,
            algorithm_id,
            integrity_hash,
        })
    }

    /// Unwrap the record key, authenticate and decrypt
    ///
    /// Fails on any authentication-tag mismatch, wrong key, or corruption;
    /// never returns partially decrypted bytes.
    pub fn open(
        &self,
        ciphertext: &[u8],
        wrapped_key: &str,
        algorithm_id: AlgorithmId,
    ) -> VaultResult<Vec<u8>> {
        let dek = self.unwrap_dek(wrapped_key)?;
        let dek_cipher = Aes256GcmCipher::new(dek)?;

        match algorithm_id {
            AlgorithmId::Aes256Gcm => {
                let sealed =
                    std::str::from_utf8(ciphertext).map_err(|_| VaultError::InvalidFormat)?;
                dek_cipher.decrypt(sealed)
            }
        }
    }

    /// Install a fresh master key as active, keeping prior keys for reads
    pub fn rotate_master_key(&self) -> VaultResult<u32> {
        let mut keys = self.keys.write();
        let new_id = keys.keys().max().copied().unwrap_or(0) + 1;
        keys.insert(new_id, Aes256GcmCipher::new(Aes256GcmCipher::generate_key())?);
        self.active_key_id.store(new_id, Ordering::Relaxed);
        Ok(new_id)
    }

    /// Re-wrap a record key under the active master key
    ///
    /// The ciphertext it protects is untouched. A key already wrapped under
    /// the active master key is returned unchanged.
    pub fn rewrap_key(&self, wrapped_key: &str) -> VaultResult<String> {
        let (key_id, _) = Self::parse_wrapped(wrapped_key)?;
        if key_id == self.active_key_id() {
            return Ok(wrapped_key.to_string());
        }
        let dek = self.unwrap_dek(wrapped_key)?;
        self.wrap_dek(&dek)
    }

    fn wrap_dek(&self, dek: &[u8; 32]) -> VaultResult<String> {
        let keys = self.keys.read();
        let active_id = self.active_key_id();
        let master = keys
            .get(&active_id)
            .ok_or(VaultError::UnknownMasterKey(active_id))?;
        Ok(format!("mk{}:{}", active_id, master.encrypt(dek)?))
    }

    fn unwrap_dek(&self, wrapped_key: &str) -> VaultResult<[u8; 32]> {
        let (key_id, inner) = Self::parse_wrapped(wrapped_key)?;
        let keys = self.keys.read();
        let master = keys
            .get(&key_id)
            .ok_or(VaultError::UnknownMasterKey(key_id))?;

        let dek_bytes = master.decrypt(inner)?;
        if dek_bytes.len() != 32 {
            return Err(VaultError::InvalidKeyLength {
                expected: 32,
                got: dek_bytes.len(),
            });
        }
        let mut dek = [0u8; 32];
        dek.copy_from_slice(&dek_bytes);
        Ok(dek)
    }

    fn parse_wrapped(wrapped_key: &str) -> VaultResult<(u32, &str)> {
        let (prefix, inner) = wrapped_key
            .split_once(':')
            .ok_or(VaultError::InvalidFormat)?;
        let key_id = prefix
            .strip_prefix("mk")
            .and_then(|id| id.parse::<u32>().ok())
            .ok_or(VaultError::InvalidFormat)?;
        Ok((key_id, inner))
    }
}
