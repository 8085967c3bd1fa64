// If code coverage tool `cargo-llvm-cov` is running with the nightly toolchain,
// enable the unstable “coverage” attribute. This allows using the annotation
// `#[coverage(off)]` to explicitly exclude certain parts of the code from
// being considered as “code under test.” Most prominently, the annotation
// should be added to every `#[cfg(test)]` module. Since the “coverage”
// feature is enable only conditionally, the annotation to use is:
// `#[cfg_attr(coverage_nightly, coverage(off))]`.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Single-key secp256k1 wallet management.
//!
//! [`WalletManager`] creates keys, protects them with a passphrase that must
//! satisfy the [`PassphrasePolicy`], signs messages and transactions, and
//! recovers signers. The cryptography is delegated to an
//! [`IdentityProvider`]; [`Secp256k1Provider`] is the one shipped here.
//!
//! ```no_run
//! use walletman::PassphrasePolicy;
//! use walletman::Secp256k1Provider;
//! use walletman::WalletManager;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let manager = WalletManager::new(Secp256k1Provider::default());
//! let handle = manager.generate().await?;
//! let blob = manager.encrypt_wallet(&handle, "Correct-Horse-Battery-9").await?;
//!
//! let reopened = manager.decrypt_wallet(&blob, "Correct-Horse-Battery-9").await?;
//! let signature = manager.sign_message(&reopened, "hello").await?;
//! assert!(manager.is_signer("hello", &signature, handle.address()).await?);
//! # assert!(PassphrasePolicy::is_valid("Correct-Horse-Battery-9"));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config_models;
pub mod models;
pub mod provider;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod tests;

pub use api::wallet::WalletError;
pub use api::wallet::WalletErrorKind;
pub use api::wallet::WalletManager;
pub use models::encrypted_blob::EncryptedBlob;
pub use models::key_handle::KeyHandle;
pub use models::passphrase_policy::PassphrasePolicy;
pub use models::seed_phrase::SeedPhrase;
pub use models::signature::Signature;
pub use models::signer_address::SignerAddress;
pub use models::transaction_request::TransactionRequest;
pub use provider::IdentityProvider;
pub use provider::ProviderError;
pub use provider::Secp256k1Provider;
