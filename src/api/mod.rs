//! public api for wallet operations
//!
//! [`wallet::WalletManager`] is the entry point. Everything it needs is
//! passed in: the identity provider once at construction, keys and
//! passphrases per call.
pub mod wallet;
