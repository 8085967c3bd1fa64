//! provides the public wallet API: [`WalletManager`] and its errors.
mod wallet_manager;

// these represent the public API
pub mod error;
pub use error::Operation;
pub use error::WalletError;
pub use error::WalletErrorKind;
pub use wallet_manager::WalletManager;
