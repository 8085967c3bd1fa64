//! Passphrase protected JSON keystore.
//!
//! ```text
//! {
//!   "version": 1,
//!   "address": "0x<40 hex>",
//!   "kdf": {"function": "argon2id", "m_cost": .., "t_cost": .., "p_cost": .., "salt": "<64 hex>"},
//!   "cipher": {"function": "aes-256-gcm", "nonce": "<24 hex>", "ciphertext": "<hex>"}
//! }
//! ```
//!
//! The AES-256-GCM key is derived from the passphrase with Argon2id. The
//! plaintext is a JSON object holding the secret key and, if known, the seed
//! phrase. Everything but the ciphertext is bound to the ciphertext as
//! associated data, and all hex must be lowercase, so that changing any
//! character of a keystore makes it fail to open.

use aead::Aead;
use aead::Key;
use aead::KeyInit;
use aead::Payload;
use aes_gcm::Aes256Gcm;
use aes_gcm::Nonce;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;
use zeroize::Zeroizing;

use super::error::ProviderError;
use crate::config_models::kdf_configuration::KdfConfiguration;
use crate::models::key_handle::SecretKeyBytes;
use crate::models::key_handle::SECRET_KEY_LEN;
use crate::models::seed_phrase::SeedPhrase;
use crate::models::signer_address::SignerAddress;
use crate::models::signer_address::ADDRESS_LEN;

pub(crate) const KEYSTORE_VERSION: u32 = 1;
const KDF_FUNCTION: &str = "argon2id";
const CIPHER_FUNCTION: &str = "aes-256-gcm";

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const DERIVED_KEY_LEN: usize = 32;
const TAG_LEN: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Keystore {
    version: u32,
    address: String,
    kdf: KdfSection,
    cipher: CipherSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct KdfSection {
    function: String,
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
    salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CipherSection {
    function: String,
    nonce: String,
    ciphertext: String,
}

/// the associated data: every keystore field except the ciphertext
#[derive(Serialize)]
struct AuthenticatedHeader<'a> {
    version: u32,
    address: &'a str,
    kdf: &'a KdfSection,
    cipher: &'a str,
    nonce: &'a str,
}

impl Keystore {
    fn authenticated_header(&self) -> Result<Vec<u8>, ProviderError> {
        let header = AuthenticatedHeader {
            version: self.version,
            address: &self.address,
            kdf: &self.kdf,
            cipher: &self.cipher.function,
            nonce: &self.cipher.nonce,
        };
        Ok(serde_json::to_vec(&header)?)
    }

    fn kdf_configuration(&self) -> KdfConfiguration {
        KdfConfiguration::new(self.kdf.m_cost, self.kdf.t_cost, self.kdf.p_cost)
    }
}

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
struct Plaintext {
    secret_key: String,
    mnemonic: Option<String>,
}

/// contents of an opened keystore
#[derive(Debug)]
pub(crate) struct OpenedKeystore {
    /// the address the keystore claims to belong to
    pub(crate) address: SignerAddress,
    pub(crate) secret_key: SecretKeyBytes,
    pub(crate) seed_phrase: Option<SeedPhrase>,
}

pub(crate) fn encrypt(
    secret_key: &SecretKeyBytes,
    seed_phrase: Option<&SeedPhrase>,
    address: &SignerAddress,
    passphrase: &str,
    kdf: &KdfConfiguration,
) -> Result<String, ProviderError> {
    kdf.validate()
        .map_err(|e| ProviderError::Kdf(e.to_string()))?;

    // 1. fresh randomness for every keystore
    let mut rng = rand::rng();
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill(&mut salt);
    rng.fill(&mut nonce);

    // 2. everything but the ciphertext
    let mut keystore = Keystore {
        version: KEYSTORE_VERSION,
        address: address.to_lowercase(),
        kdf: KdfSection {
            function: KDF_FUNCTION.to_string(),
            m_cost: kdf.m_cost,
            t_cost: kdf.t_cost,
            p_cost: kdf.p_cost,
            salt: hex::encode(salt),
        },
        cipher: CipherSection {
            function: CIPHER_FUNCTION.to_string(),
            nonce: hex::encode(nonce),
            ciphertext: String::new(),
        },
    };

    // 3. secrets to plaintext bytes
    let plaintext = Plaintext {
        secret_key: hex::encode(secret_key.as_bytes()),
        mnemonic: seed_phrase.map(|p| p.phrase().to_string()),
    };
    let plaintext_bytes = Zeroizing::new(serde_json::to_vec(&plaintext)?);

    // 4. encrypt, binding the header
    let derived_key = derive_key(passphrase, &salt, kdf)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(derived_key.as_slice()));
    let aad = keystore.authenticated_header()?;
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: &plaintext_bytes,
                aad: &aad,
            },
        )
        .map_err(ProviderError::EncryptionFailed)?;
    keystore.cipher.ciphertext = hex::encode(ciphertext);

    Ok(serde_json::to_string(&keystore)?)
}

pub(crate) fn decrypt(keystore: &str, passphrase: &str) -> Result<OpenedKeystore, ProviderError> {
    // 1. parse and check the header. no key derivation happens before the
    //    recorded costs are known to be within bounds.
    let keystore: Keystore = serde_json::from_str(keystore)?;
    if keystore.version != KEYSTORE_VERSION {
        return Err(malformed(format!(
            "unsupported version {}",
            keystore.version
        )));
    }
    if keystore.kdf.function != KDF_FUNCTION {
        return Err(malformed(format!(
            "unsupported kdf {}",
            keystore.kdf.function
        )));
    }
    if keystore.cipher.function != CIPHER_FUNCTION {
        return Err(malformed(format!(
            "unsupported cipher {}",
            keystore.cipher.function
        )));
    }
    let kdf = keystore.kdf_configuration();
    kdf.validate()
        .map_err(|e| ProviderError::Kdf(e.to_string()))?;

    let address = keystore
        .address
        .strip_prefix("0x")
        .ok_or_else(|| malformed("address lacks 0x prefix".to_string()))?;
    decode_lower_hex_array::<ADDRESS_LEN>("address", address)?;
    let salt = decode_lower_hex_array::<SALT_LEN>("salt", &keystore.kdf.salt)?;
    let nonce = decode_lower_hex_array::<NONCE_LEN>("nonce", &keystore.cipher.nonce)?;
    let ciphertext = decode_lower_hex("ciphertext", &keystore.cipher.ciphertext)?;
    if ciphertext.len() < TAG_LEN {
        return Err(malformed("ciphertext is truncated".to_string()));
    }

    // 2. decrypt, checking the header
    let derived_key = derive_key(passphrase, &salt, &kdf)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(derived_key.as_slice()));
    let aad = keystore.authenticated_header()?;
    let plaintext_bytes = Zeroizing::new(
        cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &ciphertext,
                    aad: &aad,
                },
            )
            .map_err(ProviderError::DecryptionFailed)?,
    );

    // 3. plaintext bytes to secrets
    let plaintext: Plaintext = serde_json::from_slice(&plaintext_bytes)?;
    let secret_key = SecretKeyBytes::new(decode_lower_hex_array::<SECRET_KEY_LEN>(
        "secret key",
        &plaintext.secret_key,
    )?);
    let seed_phrase = plaintext.mnemonic.as_deref().map(SeedPhrase::new);

    Ok(OpenedKeystore {
        address: SignerAddress::new(keystore.address),
        secret_key,
        seed_phrase,
    })
}

fn derive_key(
    passphrase: &str,
    salt: &[u8; SALT_LEN],
    kdf: &KdfConfiguration,
) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>, ProviderError> {
    let params = argon2::Params::new(kdf.m_cost, kdf.t_cost, kdf.p_cost, Some(DERIVED_KEY_LEN))
        .map_err(|e| ProviderError::Kdf(format!("invalid Argon2 parameters: {e}")))?;
    let argon2 = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut output[..])
        .map_err(|e| ProviderError::Kdf(format!("Argon2id derivation failed: {e}")))?;
    Ok(output)
}

fn malformed(reason: String) -> ProviderError {
    ProviderError::MalformedKeystore(reason)
}

fn decode_lower_hex(field: &str, text: &str) -> Result<Vec<u8>, ProviderError> {
    if !text.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(malformed(format!("{field} is not lowercase hex")));
    }
    hex::decode(text).map_err(|e| malformed(format!("{field}: {e}")))
}

fn decode_lower_hex_array<const N: usize>(
    field: &str,
    text: &str,
) -> Result<[u8; N], ProviderError> {
    let bytes = Zeroizing::new(decode_lower_hex(field, text)?);
    let mut array = [0u8; N];
    if bytes.len() != N {
        return Err(malformed(format!(
            "{field} must be {N} bytes, got {}",
            bytes.len()
        )));
    }
    array.copy_from_slice(&bytes);
    Ok(array)
}
