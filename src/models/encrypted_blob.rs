use serde::Deserialize;
use serde::Serialize;

/// Passphrase-encrypted key material, as produced by the provider's keystore
/// encryption.
///
/// The content is self-describing but opaque here: nothing in the wallet
/// manager parses or edits it. Storing it is the caller's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedBlob(String);

impl EncryptedBlob {
    pub fn new(blob: impl Into<String>) -> Self {
        Self(blob.into())
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

impl std::fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncryptedBlob {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
