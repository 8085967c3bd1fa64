// private module.  no need for module docs.

use std::sync::Arc;

use tokio::task;
use tracing::debug;
use tracing::warn;
use zeroize::Zeroizing;

use super::error::Operation;
use super::error::WalletError;
use crate::models::encrypted_blob::EncryptedBlob;
use crate::models::key_handle::KeyHandle;
use crate::models::passphrase_policy::PassphrasePolicy;
use crate::models::seed_phrase::SeedPhrase;
use crate::models::signature::Signature;
use crate::models::signer_address::SignerAddress;
use crate::models::transaction_request::TransactionRequest;
use crate::provider::IdentityProvider;
use crate::provider::ProviderError;

/// Manages the life cycle of a single-key wallet.
///
/// Creates keys, encrypts them under a passphrase that satisfies the
/// [`PassphrasePolicy`], decrypts them again, signs messages and transactions,
/// and recovers who signed a message. The cryptography is done by the
/// [`IdentityProvider`] given to [`WalletManager::new`].
///
/// The manager holds no key material and no other state: every call takes
/// what it needs and hands back what it produced. It is cheap to clone and
/// can be shared across tasks freely.
///
/// Provider calls run on tokio's blocking thread pool, so every operation is
/// `async` and a tokio runtime must be running.
///
/// ### errors
///
/// Every operation fails with a [`WalletError`], whose
/// [`kind`](WalletError::kind) tells what went wrong. Inputs are checked
/// before the provider is consulted, in the order listed on each method.
#[derive(Debug)]
pub struct WalletManager<P> {
    provider: Arc<P>,
}

// derive(Clone) would require P: Clone
impl<P> Clone for WalletManager<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: IdentityProvider> From<Arc<P>> for WalletManager<P> {
    fn from(provider: Arc<P>) -> Self {
        Self { provider }
    }
}

impl<P: IdentityProvider> WalletManager<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// generate a new random key, with its seed phrase
    ///
    /// errors:
    ///  - `ProviderFailure` if the provider cannot produce a key
    pub async fn generate(&self) -> Result<KeyHandle, WalletError> {
        let operation = Operation::Generate;

        let handle = self
            .run(|provider| provider.create_random_key())
            .await
            .map_err(|source| WalletError::ProviderFailure { operation, source })
            .inspect_err(log_failure)?;

        debug!("{operation}: created key for {}", handle.address());
        Ok(handle)
    }

    /// rebuild the key a seed phrase stands for
    ///
    /// errors, in order:
    ///  - `EmptySeedPhrase`
    ///  - `InvalidSeedPhrase` if the provider does not accept the words
    ///  - `ProviderFailure` otherwise
    pub async fn import_seed_phrase(&self, phrase: &SeedPhrase) -> Result<KeyHandle, WalletError> {
        let operation = Operation::ImportSeedPhrase;

        if phrase.is_empty() {
            return Err(WalletError::EmptySeedPhrase { operation }).inspect_err(log_failure);
        }

        let phrase = phrase.clone();
        let handle = self
            .run(move |provider| provider.key_from_phrase(&phrase))
            .await
            .map_err(|source| match source {
                ProviderError::InvalidSeedPhrase(_) => {
                    WalletError::InvalidSeedPhrase { operation, source }
                }
                _ => WalletError::ProviderFailure { operation, source },
            })
            .inspect_err(log_failure)?;

        debug!("{operation}: imported key for {}", handle.address());
        Ok(handle)
    }

    /// encrypt a key under a passphrase
    ///
    /// The passphrase must satisfy every rule of the [`PassphrasePolicy`].
    /// The returned blob is exactly what the provider produced.
    ///
    /// errors, in order:
    ///  - `InvalidPassphrase`, listing the policy and the unmet rules
    ///  - `ProviderFailure` if encryption fails
    pub async fn encrypt_wallet(
        &self,
        handle: &KeyHandle,
        passphrase: &str,
    ) -> Result<EncryptedBlob, WalletError> {
        let operation = Operation::EncryptWallet;

        let unmet = PassphrasePolicy::unmet_rules(passphrase);
        if !unmet.is_empty() {
            return Err(WalletError::InvalidPassphrase {
                operation,
                unmet,
                policy: PassphrasePolicy::summary(),
            })
            .inspect_err(log_failure);
        }

        let handle = handle.clone();
        let passphrase = Zeroizing::new(passphrase.to_string());
        let blob = self
            .run(move |provider| provider.keystore_encrypt(&handle, &passphrase))
            .await
            .map_err(|source| WalletError::ProviderFailure { operation, source })
            .inspect_err(log_failure)?;

        debug!("{operation}: encrypted wallet");
        Ok(EncryptedBlob::new(blob))
    }

    /// decrypt a blob made by [`Self::encrypt_wallet`]
    ///
    /// Passphrase strength is not checked here: a passphrase that opened a
    /// wallet yesterday opens it today, whatever the policy says.
    ///
    /// errors, in order:
    ///  - `EmptyEncryptedWallet`
    ///  - `EmptyPassphrase`
    ///  - `DecryptionFailed` if the provider rejects blob or passphrase, for
    ///    whatever reason
    ///  - `ProviderFailure` if the provider task itself did not complete
    ///    ([`ProviderError::TaskFailed`])
    pub async fn decrypt_wallet(
        &self,
        blob: &EncryptedBlob,
        passphrase: &str,
    ) -> Result<KeyHandle, WalletError> {
        let operation = Operation::DecryptWallet;

        if blob.is_empty() {
            return Err(WalletError::EmptyEncryptedWallet { operation }).inspect_err(log_failure);
        }
        if passphrase.is_empty() {
            return Err(WalletError::EmptyPassphrase { operation }).inspect_err(log_failure);
        }

        let blob = blob.clone();
        let passphrase = Zeroizing::new(passphrase.to_string());
        let handle = self
            .run(move |provider| provider.keystore_decrypt(blob.as_str(), &passphrase))
            .await
            .map_err(|source| match source {
                ProviderError::TaskFailed(_) => WalletError::ProviderFailure { operation, source },
                _ => WalletError::DecryptionFailed { operation, source },
            })
            .inspect_err(log_failure)?;

        debug!("{operation}: decrypted wallet of {}", handle.address());
        Ok(handle)
    }

    /// sign a message, personal-message style
    ///
    /// errors, in order:
    ///  - `EmptyMessage`
    ///  - `SigningFailed` if the provider cannot sign
    pub async fn sign_message(
        &self,
        handle: &KeyHandle,
        message: &str,
    ) -> Result<Signature, WalletError> {
        let operation = Operation::SignMessage;

        if message.is_empty() {
            return Err(WalletError::EmptyMessage { operation }).inspect_err(log_failure);
        }

        let handle = handle.clone();
        let message = message.to_string();
        let signature = self
            .run(move |provider| provider.sign_message_hash(&handle, &message))
            .await
            .map_err(|source| signing_failed(operation, source))
            .inspect_err(log_failure)?;

        debug!("{operation}: signed message");
        Ok(signature)
    }

    /// the address whose key produced `signature` over `message`
    ///
    /// A signature over another message recovers another address rather
    /// than failing.
    ///
    /// errors, in order:
    ///  - `EmptyMessage`
    ///  - `EmptySignature`
    ///  - `ProviderFailure` if the signature is malformed or recovery fails
    pub async fn recover_signer(
        &self,
        message: &str,
        signature: &Signature,
    ) -> Result<SignerAddress, WalletError> {
        let address = self
            .recover(Operation::RecoverSigner, message, signature)
            .await
            .inspect_err(log_failure)?;

        debug!("{}: recovered {address}", Operation::RecoverSigner);
        Ok(address)
    }

    /// whether `candidate` signed `message`
    ///
    /// Addresses are compared ignoring ASCII case. A mismatch is `Ok(false)`,
    /// not an error.
    ///
    /// errors, in order:
    ///  - `EmptyCandidateSigner`
    ///  - the errors of [`Self::recover_signer`]
    pub async fn is_signer(
        &self,
        message: &str,
        signature: &Signature,
        candidate: &SignerAddress,
    ) -> Result<bool, WalletError> {
        let operation = Operation::IsSigner;

        if candidate.is_empty() {
            return Err(WalletError::EmptyCandidateSigner { operation }).inspect_err(log_failure);
        }

        let recovered = self
            .recover(operation, message, signature)
            .await
            .inspect_err(log_failure)?;
        let is_signer = recovered.matches(candidate);

        debug!("{operation}: {candidate} signed: {is_signer}");
        Ok(is_signer)
    }

    /// sign a transaction, returning it `0x`-hex encoded and ready for
    /// broadcast
    ///
    /// The transaction is handed to the provider as is; the provider decides
    /// which fields are required.
    ///
    /// errors:
    ///  - `SigningFailed` if the provider rejects the transaction or cannot
    ///    sign
    pub async fn sign_transaction(
        &self,
        handle: &KeyHandle,
        transaction: &TransactionRequest,
    ) -> Result<String, WalletError> {
        let operation = Operation::SignTransaction;

        let handle = handle.clone();
        let transaction = transaction.clone();
        let signed = self
            .run(move |provider| provider.sign_transaction(&handle, &transaction))
            .await
            .map_err(|source| signing_failed(operation, source))
            .inspect_err(log_failure)?;

        debug!("{operation}: signed transaction");
        Ok(signed)
    }

    async fn recover(
        &self,
        operation: Operation,
        message: &str,
        signature: &Signature,
    ) -> Result<SignerAddress, WalletError> {
        if message.is_empty() {
            return Err(WalletError::EmptyMessage { operation });
        }
        if signature.is_empty() {
            return Err(WalletError::EmptySignature { operation });
        }

        let message = message.to_string();
        let signature = signature.clone();
        self.run(move |provider| provider.recover_address(&message, signature.as_str()))
            .await
            .map_err(|source| WalletError::ProviderFailure { operation, source })
    }

    /// run a provider call on the blocking thread pool
    async fn run<T, F>(&self, f: F) -> Result<T, ProviderError>
    where
        T: Send + 'static,
        F: FnOnce(&P) -> Result<T, ProviderError> + Send + 'static,
    {
        let provider = Arc::clone(&self.provider);
        task::spawn_blocking(move || f(&provider))
            .await
            .map_err(|e| ProviderError::TaskFailed(e.to_string()))?
    }
}

fn signing_failed(operation: Operation, source: ProviderError) -> WalletError {
    match source {
        ProviderError::TaskFailed(_) => WalletError::ProviderFailure { operation, source },
        _ => WalletError::SigningFailed { operation, source },
    }
}

fn log_failure(error: &WalletError) {
    match error.provider_error() {
        Some(source) => warn!("{error}. cause: {source}"),
        None => warn!("{error}"),
    }
}
