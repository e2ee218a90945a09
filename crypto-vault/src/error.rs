use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed: authentication or corruption")]
    DecryptionFailed,

    #[error("Plaintext must not be empty")]
    EmptyPlaintext,

    #[error("No encryption algorithm configured for classification {0}")]
    UnsupportedClassification(data_classification::Classification),

    #[error("Invalid key")]
    InvalidKey,

    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Unknown master key id: {0}")]
    UnknownMasterKey(u32),

    #[error("Invalid sealed data format")]
    InvalidFormat,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type VaultResult<T> = Result<T, VaultError>;
