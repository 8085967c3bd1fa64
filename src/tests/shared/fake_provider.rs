//! An [`IdentityProvider`] for tests: real cryptography with light KDF costs,
//! a record of every call, and failures injected on demand.

use std::sync::Mutex;

use super::light_kdf;
use crate::models::key_handle::KeyHandle;
use crate::models::seed_phrase::SeedPhrase;
use crate::models::signature::Signature;
use crate::models::signer_address::SignerAddress;
use crate::models::transaction_request::TransactionRequest;
use crate::provider::IdentityProvider;
use crate::provider::ProviderError;
use crate::provider::Secp256k1Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeCall {
    CreateRandomKey,
    KeyFromPhrase,
    KeystoreEncrypt,
    KeystoreDecrypt,
    SignMessageHash,
    RecoverAddress,
    SignTransaction,
}

#[derive(Debug, Clone, Copy)]
enum Injected {
    Error(FakeCall),
    Panic(FakeCall),
}

#[derive(Debug)]
pub struct FakeProvider {
    inner: Secp256k1Provider,
    injected: Option<Injected>,
    calls: Mutex<Vec<FakeCall>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            inner: Secp256k1Provider::new(light_kdf()),
            injected: None,
            calls: Mutex::new(vec![]),
        }
    }

    /// `call` returns [`ProviderError::Failed`]
    pub fn failing(call: FakeCall) -> Self {
        Self {
            injected: Some(Injected::Error(call)),
            ..Self::new()
        }
    }

    /// `call` panics
    pub fn panicking(call: FakeCall) -> Self {
        Self {
            injected: Some(Injected::Panic(call)),
            ..Self::new()
        }
    }

    /// calls received so far, in order
    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, call: FakeCall) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(call);
        match self.injected {
            Some(Injected::Error(c)) if c == call => Err(ProviderError::Failed(format!(
                "injected failure in {call:?}"
            ))),
            Some(Injected::Panic(c)) if c == call => panic!("injected panic in {call:?}"),
            _ => Ok(()),
        }
    }
}

impl IdentityProvider for FakeProvider {
    fn create_random_key(&self) -> Result<KeyHandle, ProviderError> {
        self.enter(FakeCall::CreateRandomKey)?;
        self.inner.create_random_key()
    }

    fn key_from_phrase(&self, phrase: &SeedPhrase) -> Result<KeyHandle, ProviderError> {
        self.enter(FakeCall::KeyFromPhrase)?;
        self.inner.key_from_phrase(phrase)
    }

    fn keystore_encrypt(&self, handle: &KeyHandle, passphrase: &str) -> Result<String, ProviderError> {
        self.enter(FakeCall::KeystoreEncrypt)?;
        self.inner.keystore_encrypt(handle, passphrase)
    }

    fn keystore_decrypt(&self, keystore: &str, passphrase: &str) -> Result<KeyHandle, ProviderError> {
        self.enter(FakeCall::KeystoreDecrypt)?;
        self.inner.keystore_decrypt(keystore, passphrase)
    }

    fn sign_message_hash(&self, handle: &KeyHandle, message: &str) -> Result<Signature, ProviderError> {
        self.enter(FakeCall::SignMessageHash)?;
        self.inner.sign_message_hash(handle, message)
    }

    fn recover_address(&self, message: &str, signature: &str) -> Result<SignerAddress, ProviderError> {
        self.enter(FakeCall::RecoverAddress)?;
        self.inner.recover_address(message, signature)
    }

    fn sign_transaction(
        &self,
        handle: &KeyHandle,
        transaction: &TransactionRequest,
    ) -> Result<String, ProviderError> {
        self.enter(FakeCall::SignTransaction)?;
        self.inner.sign_transaction(handle, transaction)
    }
}
