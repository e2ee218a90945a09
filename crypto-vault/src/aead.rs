use crate::error::{VaultError, VaultResult};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use zeroize::ZeroizeOnDrop;

/// AES-256-GCM cipher over a single 32-byte key
///
/// - 96-bit random nonce per call (recommended for GCM)
/// - authentication tag verified on every decrypt
/// - key material zeroized on drop
#[derive(ZeroizeOnDrop)]
pub struct Aes256GcmCipher {
    #[zeroize(skip)]
    cipher: Aes256Gcm,
    /// Raw key - automatically zeroized on drop
    key: [u8; 32],
}

impl Aes256GcmCipher {
    /// Create a new cipher over a 32-byte key
    pub fn new(key: [u8; 32]) -> VaultResult<Self> {
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| VaultError::InvalidKey)?;
        Ok(Self { cipher, key })
    }

    /// Generate a new random key (cryptographically secure)
    pub fn generate_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt with a fresh nonce, producing `{nonce_b64}:{ciphertext_b64}`
    pub fn encrypt(&self, plaintext: &[u8]) -> VaultResult<String> {
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| VaultError::EncryptionFailed)?;

        Ok(format!(
            "{}:{}",
            BASE64.encode(nonce_bytes),
            BASE64.encode(&ciphertext)
        ))
    }

    /// Decrypt `{nonce_b64}:{ciphertext_b64}`, verifying the authentication tag
    pub fn decrypt(&self, sealed: &str) -> VaultResult<Vec<u8>> {
        let (nonce_part, ct_part) = sealed
            .split_once(':')
            .ok_or(VaultError::InvalidFormat)?;

        let nonce_bytes = BASE64
            .decode(nonce_part)
            .map_err(|_| VaultError::InvalidFormat)?;
        if nonce_bytes.len() != 12 {
            return Err(VaultError::InvalidFormat);
        }
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = BASE64
            .decode(ct_part)
            .map_err(|_| VaultError::InvalidFormat)?;

        self.cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| VaultError::DecryptionFailed)
    }

    /// Expose the raw key bytes for wrapping under another key
    pub(crate) fn key_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cipher = Aes256GcmCipher::new(Aes256GcmCipher::generate_key()).unwrap();

        let plaintext = b"account ledger for Q3";
        let sealed = cipher.encrypt(plaintext).unwrap();
        let opened = cipher.decrypt(&sealed).unwrap();

        assert_eq!(plaintext, opened.as_slice());
    }

    #[test]
    fn test_different_nonces() {
        let cipher = Aes256GcmCipher::new(Aes256GcmCipher::generate_key()).unwrap();

        let sealed1 = cipher.encrypt(b"same plaintext").unwrap();
        let sealed2 = cipher.encrypt(b"same plaintext").unwrap();

        // Same plaintext must produce different ciphertexts (fresh nonce per call)
        assert_ne!(sealed1, sealed2);
        assert_eq!(cipher.decrypt(&sealed1).unwrap(), b"same plaintext");
        assert_eq!(cipher.decrypt(&sealed2).unwrap(), b"same plaintext");
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let cipher = Aes256GcmCipher::new(Aes256GcmCipher::generate_key()).unwrap();

        let sealed = cipher.encrypt(b"authenticated data").unwrap();
        let mut tampered = sealed.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] ^= 0x01;
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(matches!(
            cipher.decrypt(&tampered),
            Err(VaultError::DecryptionFailed) | Err(VaultError::InvalidFormat)
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let cipher1 = Aes256GcmCipher::new(Aes256GcmCipher::generate_key()).unwrap();
        let cipher2 = Aes256GcmCipher::new(Aes256GcmCipher::generate_key()).unwrap();

        let sealed = cipher1.encrypt(b"keyed data").unwrap();
        assert!(matches!(
            cipher2.decrypt(&sealed),
            Err(VaultError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_malformed_input() {
        let cipher = Aes256GcmCipher::new(Aes256GcmCipher::generate_key()).unwrap();

        assert!(matches!(
            cipher.decrypt("not-a-sealed-value"),
            Err(VaultError::InvalidFormat)
        ));
        assert!(matches!(
            cipher.decrypt("AAAA:%%%%"),
            Err(VaultError::InvalidFormat)
        ));
    }

    #[test]
    fn test_key_generation_is_random() {
        assert_ne!(
            Aes256GcmCipher::generate_key(),
            Aes256GcmCipher::generate_key()
        );
    }
}
