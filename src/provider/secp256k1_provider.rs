//! provides the production [`IdentityProvider`]: secp256k1 keys with
//! Ethereum-style addresses, message signatures and transactions.

use alloy_signer_local::coins_bip39::English;
use alloy_signer_local::MnemonicBuilder;
use bip39::Language;
use bip39::Mnemonic;
use rand::Rng;
use secp256k1::ecdsa::RecoverableSignature;
use secp256k1::ecdsa::RecoveryId;
use secp256k1::All;
use secp256k1::Message;
use secp256k1::PublicKey;
use secp256k1::Secp256k1;
use secp256k1::SecretKey;
use zeroize::Zeroizing;

use super::error::ProviderError;
use super::ethereum::address_of;
use super::ethereum::personal_message_hash;
use super::keystore;
use super::transaction_codec::UnsignedTransaction;
use super::IdentityProvider;
use crate::config_models::kdf_configuration::KdfConfiguration;
use crate::models::key_handle::KeyHandle;
use crate::models::key_handle::SecretKeyBytes;
use crate::models::key_handle::SECRET_KEY_LEN;
use crate::models::seed_phrase::SeedPhrase;
use crate::models::signature::Signature;
use crate::models::signature::SIGNATURE_LEN;
use crate::models::signer_address::SignerAddress;
use crate::models::transaction_request::TransactionRequest;

/// 128 bits of entropy, a 12 word mnemonic
const ENTROPY_LEN: usize = 16;

/// BIP-44 path of the first Ethereum account
const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// added to the recovery id in the last byte of a message signature
const RECOVERY_ID_OFFSET: u8 = 27;

/// Generates, stores and uses secp256k1 keys.
///
/// Keys are born from a BIP-39 mnemonic and derived at `m/44'/60'/0'/0/0`
/// with an empty BIP-39 password, so a phrase opens the same account here as
/// in any other Ethereum wallet. Only that first account is ever used.
///
/// Keystores are written with the costs in [`KdfConfiguration`] and opened
/// with whatever costs they record.
#[derive(Debug, Clone)]
pub struct Secp256k1Provider {
    secp: Secp256k1<All>,
    kdf: KdfConfiguration,
}

impl Default for Secp256k1Provider {
    fn default() -> Self {
        Self::new(KdfConfiguration::default())
    }
}

impl Secp256k1Provider {
    pub fn new(kdf: KdfConfiguration) -> Self {
        Self {
            secp: Secp256k1::new(),
            kdf,
        }
    }

    pub fn kdf_configuration(&self) -> &KdfConfiguration {
        &self.kdf
    }

    fn key_from_mnemonic(&self, mnemonic: &Mnemonic) -> Result<KeyHandle, ProviderError> {
        let account = MnemonicBuilder::<English>::default()
            .phrase(mnemonic.phrase())
            .derivation_path(DERIVATION_PATH)
            .and_then(|builder| builder.build())
            .map_err(|e| ProviderError::KeyGeneration(format!("BIP-44 derivation failed: {e}")))?;

        let mut secret = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        secret.copy_from_slice(&account.credential().to_bytes());
        self.handle_from_secret(
            SecretKeyBytes::new(*secret),
            Some(SeedPhrase::new(mnemonic.phrase())),
        )
    }

    fn handle_from_secret(
        &self,
        secret: SecretKeyBytes,
        seed_phrase: Option<SeedPhrase>,
    ) -> Result<KeyHandle, ProviderError> {
        let secret_key = SecretKey::from_slice(secret.as_bytes()).map_err(ProviderError::InvalidKey)?;
        let public_key = PublicKey::from_secret_key(&self.secp, &secret_key);
        Ok(KeyHandle::from_parts(
            secret,
            public_key.serialize(),
            address_of(&public_key),
            seed_phrase,
        ))
    }

    fn sign_digest(
        &self,
        handle: &KeyHandle,
        digest: [u8; 32],
    ) -> Result<(RecoveryId, [u8; 64]), ProviderError> {
        let secret_key =
            SecretKey::from_slice(handle.secret_key().as_bytes()).map_err(ProviderError::InvalidKey)?;
        let signature = self
            .secp
            .sign_ecdsa_recoverable(&Message::from_digest(digest), &secret_key);
        Ok(signature.serialize_compact())
    }
}

impl IdentityProvider for Secp256k1Provider {
    fn create_random_key(&self) -> Result<KeyHandle, ProviderError> {
        let mut entropy = Zeroizing::new([0u8; ENTROPY_LEN]);
        rand::rng().fill(&mut entropy[..]);
        let mnemonic = Mnemonic::from_entropy(&entropy[..], Language::English)
            .map_err(|e| ProviderError::KeyGeneration(e.to_string()))?;
        self.key_from_mnemonic(&mnemonic)
    }

    fn key_from_phrase(&self, phrase: &SeedPhrase) -> Result<KeyHandle, ProviderError> {
        let mnemonic = Mnemonic::from_phrase(phrase.phrase(), Language::English)
            .map_err(|e| ProviderError::InvalidSeedPhrase(e.to_string()))?;
        self.key_from_mnemonic(&mnemonic)
    }

    fn keystore_encrypt(&self, handle: &KeyHandle, passphrase: &str) -> Result<String, ProviderError> {
        keystore::encrypt(
            handle.secret_key(),
            handle.seed_phrase(),
            handle.address(),
            passphrase,
            &self.kdf,
        )
    }

    fn keystore_decrypt(&self, keystore: &str, passphrase: &str) -> Result<KeyHandle, ProviderError> {
        let opened = keystore::decrypt(keystore, passphrase)?;
        let keystore::OpenedKeystore {
            address,
            secret_key,
            seed_phrase,
        } = opened;

        let handle = self.handle_from_secret(secret_key, seed_phrase)?;
        if !handle.address().matches(&address) {
            return Err(ProviderError::AddressMismatch {
                expected: address.to_string(),
                actual: handle.address().to_string(),
            });
        }
        Ok(handle)
    }

    fn sign_message_hash(&self, handle: &KeyHandle, message: &str) -> Result<Signature, ProviderError> {
        let (recovery_id, compact) =
            self.sign_digest(handle, personal_message_hash(message.as_bytes()))?;

        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..64].copy_from_slice(&compact);
        bytes[64] = recovery_byte(recovery_id) + RECOVERY_ID_OFFSET;
        Ok(Signature::from_bytes(&bytes))
    }

    fn recover_address(&self, message: &str, signature: &str) -> Result<SignerAddress, ProviderError> {
        let bytes = decode_signature(signature)?;
        let recovery_id = match bytes[64] {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - RECOVERY_ID_OFFSET,
            v => {
                return Err(ProviderError::MalformedSignature(format!(
                    "invalid recovery byte {v}"
                )))
            }
        };
        let recovery_id = RecoveryId::from_i32(i32::from(recovery_id))
            .map_err(|e| ProviderError::MalformedSignature(e.to_string()))?;
        let signature = RecoverableSignature::from_compact(&bytes[..64], recovery_id)
            .map_err(|e| ProviderError::MalformedSignature(e.to_string()))?;

        let digest = personal_message_hash(message.as_bytes());
        let public_key = self
            .secp
            .recover_ecdsa(&Message::from_digest(digest), &signature)
            .map_err(ProviderError::RecoveryFailed)?;
        Ok(address_of(&public_key))
    }

    fn sign_transaction(
        &self,
        handle: &KeyHandle,
        transaction: &TransactionRequest,
    ) -> Result<String, ProviderError> {
        let unsigned = UnsignedTransaction::from_request(transaction)?;
        let (recovery_id, compact) = self.sign_digest(handle, unsigned.signing_hash())?;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);

        let signed = unsigned.encode_signed(recovery_byte(recovery_id) == 1, &r, &s);
        Ok(format!("0x{}", hex::encode(signed)))
    }
}

// ids 2 and 3 require r >= n, which does not happen in practice
fn recovery_byte(recovery_id: RecoveryId) -> u8 {
    (recovery_id.to_i32() & 0x03) as u8
}

fn decode_signature(signature: &str) -> Result<[u8; SIGNATURE_LEN], ProviderError> {
    let digits = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = hex::decode(digits).map_err(|e| ProviderError::MalformedSignature(e.to_string()))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        ProviderError::MalformedSignature(format!(
            "expected {SIGNATURE_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}
