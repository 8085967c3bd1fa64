//! provides the error type of identity providers.

/// enumerates failures of the cryptographic identity provider
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid secret key")]
    InvalidKey(#[source] secp256k1::Error),

    #[error("invalid seed phrase: {0}")]
    InvalidSeedPhrase(String),

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("encryption failed")]
    EncryptionFailed(#[source] aead::Error),

    #[error("decryption failed. wrong passphrase or corrupted keystore")]
    DecryptionFailed(#[source] aead::Error),

    #[error("malformed keystore: {0}")]
    MalformedKeystore(String),

    #[error("keystore json is invalid")]
    KeystoreJson(#[from] serde_json::Error),

    #[error("keystore belongs to {expected} but decrypts to {actual}")]
    AddressMismatch { expected: String, actual: String },

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("signer recovery failed")]
    RecoveryFailed(#[source] secp256k1::Error),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("provider task did not complete: {0}")]
    TaskFailed(String),

    // catch-all, for providers that wrap foreign libraries
    #[error("provider failed.  reason: {0}")]
    Failed(String),
}
