use serde::Deserialize;
use serde::Serialize;

/// byte length of a recoverable signature: r (32) || s (32) || v (1)
pub const SIGNATURE_LEN: usize = 65;

/// A recoverable message signature rendered as `0x` + 130 hex digits.
///
/// The text is produced by an
/// [`IdentityProvider`](crate::provider::IdentityProvider) and is opaque to
/// the wallet manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn new(signature: impl Into<String>) -> Self {
        Self(signature.into())
    }

    /// encode `r || s || v` as `0x`-prefixed lowercase hex
    pub fn from_bytes(bytes: &[u8; SIGNATURE_LEN]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
