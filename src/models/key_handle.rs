use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

use super::seed_phrase::SeedPhrase;
use super::signer_address::SignerAddress;

/// byte length of a secp256k1 secret key
pub const SECRET_KEY_LEN: usize = 32;

/// byte length of a compressed secp256k1 public key
pub const PUBLIC_KEY_LEN: usize = 33;

/// Raw secret key bytes. Wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKeyBytes([u8; SECRET_KEY_LEN]);

impl SecretKeyBytes {
    pub fn new(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKeyBytes(..)")
    }
}

/// An in-memory key pair plus the identity derived from it.
///
/// A `KeyHandle` is built by an
/// [`IdentityProvider`](crate::provider::IdentityProvider), which guarantees
/// that the public key and address are derived from the secret key. The
/// wallet manager hands handles to the caller and keeps no copy.
///
/// Equality is deep: secret key, public key, address and seed phrase.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop)]
pub struct KeyHandle {
    secret_key: SecretKeyBytes,
    #[zeroize(skip)]
    public_key: [u8; PUBLIC_KEY_LEN],
    #[zeroize(skip)]
    address: SignerAddress,
    seed_phrase: Option<SeedPhrase>,
}

impl KeyHandle {
    /// Assemble a handle from its parts.
    ///
    /// Providers call this after deriving `public_key` and `address` from
    /// `secret_key`; nothing here re-checks that derivation.
    pub fn from_parts(
        secret_key: SecretKeyBytes,
        public_key: [u8; PUBLIC_KEY_LEN],
        address: SignerAddress,
        seed_phrase: Option<SeedPhrase>,
    ) -> Self {
        Self {
            secret_key,
            public_key,
            address,
            seed_phrase,
        }
    }

    pub fn secret_key(&self) -> &SecretKeyBytes {
        &self.secret_key
    }

    /// compressed SEC1 public key
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// compressed public key as `0x` + 66 hex digits
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key))
    }

    pub fn address(&self) -> &SignerAddress {
        &self.address
    }

    /// `None` for keys that were not created from a mnemonic
    pub fn seed_phrase(&self) -> Option<&SeedPhrase> {
        self.seed_phrase.as_ref()
    }
}

impl std::fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHandle")
            .field("address", &self.address)
            .field("public_key", &self.public_key_hex())
            .field("seed_phrase", &self.seed_phrase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn handle() -> KeyHandle {
        KeyHandle::from_parts(
            SecretKeyBytes::new([0x46; SECRET_KEY_LEN]),
            [2; PUBLIC_KEY_LEN],
            SignerAddress::from("0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F"),
            Some(SeedPhrase::new("legal winner thank year wave sausage")),
        )
    }

    #[test]
    fn debug_redacts_secrets() {
        let shown = format!("{:?}", handle());
        assert!(!shown.contains("4646"));
        assert!(!shown.contains("legal"));
        assert!(shown.contains("0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F"));
    }

    #[test]
    fn public_key_hex_shape() {
        let hex = handle().public_key_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(68, hex.len());
    }

    #[test]
    fn equality_is_deep() {
        let a = handle();
        let b = KeyHandle::from_parts(
            a.secret_key().clone(),
            *a.public_key(),
            a.address().clone(),
            None,
        );
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
