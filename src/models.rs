//! value types passed between caller, wallet manager and provider.
pub mod encrypted_blob;
pub mod key_handle;
pub mod passphrase_policy;
pub mod seed_phrase;
pub mod signature;
pub mod signer_address;
pub mod transaction_request;
