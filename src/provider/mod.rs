//! The cryptographic identity provider.
//!
//! [`WalletManager`](crate::api::wallet::WalletManager) never touches a
//! cryptographic primitive. Key generation, keystore encryption, signing and
//! signer recovery are delegated to an [`IdentityProvider`], injected once
//! when the manager is built.
//!
//! [`Secp256k1Provider`] is the implementation used in production. Tests plug
//! in their own.

pub mod error;
mod ethereum;
mod keystore;
pub mod secp256k1_provider;
mod transaction_codec;

pub use error::ProviderError;
pub use secp256k1_provider::Secp256k1Provider;

use crate::models::key_handle::KeyHandle;
use crate::models::seed_phrase::SeedPhrase;
use crate::models::signature::Signature;
use crate::models::signer_address::SignerAddress;
use crate::models::transaction_request::TransactionRequest;

/// Capability interface over the cryptographic primitives.
///
/// Methods are blocking: key derivation in particular is deliberately slow.
/// The wallet manager calls them from tokio's blocking thread pool, hence the
/// `Send + Sync + 'static` bound.
///
/// Implementations must be deterministic where the underlying primitive is:
/// the same key signing the same message yields the same signature, and
/// `keystore_decrypt(keystore_encrypt(k, p), p)` yields a handle equal to
/// `k`.
pub trait IdentityProvider: Send + Sync + 'static {
    /// a fresh key pair, with the seed phrase it was derived from
    fn create_random_key(&self) -> Result<KeyHandle, ProviderError>;

    /// the key pair a seed phrase stands for
    fn key_from_phrase(&self, phrase: &SeedPhrase) -> Result<KeyHandle, ProviderError>;

    /// serialize and encrypt a key under a passphrase
    fn keystore_encrypt(&self, handle: &KeyHandle, passphrase: &str) -> Result<String, ProviderError>;

    /// inverse of [`Self::keystore_encrypt`]
    fn keystore_decrypt(&self, keystore: &str, passphrase: &str) -> Result<KeyHandle, ProviderError>;

    /// sign the personal-message digest of `message`
    fn sign_message_hash(&self, handle: &KeyHandle, message: &str) -> Result<Signature, ProviderError>;

    /// the address whose key produced `signature` over `message`
    fn recover_address(&self, message: &str, signature: &str) -> Result<SignerAddress, ProviderError>;

    /// sign a transaction, returning it serialized for broadcast
    fn sign_transaction(
        &self,
        handle: &KeyHandle,
        transaction: &TransactionRequest,
    ) -> Result<String, ProviderError>;
}
