//! public identity of a signer.

use std::hash::Hash;
use std::hash::Hasher;

use serde::Deserialize;
use serde::Serialize;

/// number of bytes in an address
pub const ADDRESS_LEN: usize = 20;

/// An account address, usually in EIP-55 mixed-case checksum form.
///
/// Construction never fails: a `SignerAddress` can hold any text, so that a
/// malformed candidate simply compares unequal to a real address. Use
/// [`SignerAddress::is_well_formed`] to check the shape.
///
/// Equality ignores ASCII case and nothing else. It is locale independent.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignerAddress(String);

impl SignerAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// identity comparison: ASCII case-insensitive.
    pub fn matches(&self, other: &SignerAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// `0x` followed by exactly 40 hex digits, in any case
    pub fn is_well_formed(&self) -> bool {
        self.0.strip_prefix("0x").is_some_and(|hex| {
            hex.len() == ADDRESS_LEN * 2 && hex.bytes().all(|b| b.is_ascii_hexdigit())
        })
    }

    /// lowercase rendering, as used inside keystores
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl PartialEq for SignerAddress {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

// must agree with `matches`
impl Hash for SignerAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl std::fmt::Display for SignerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SignerAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

impl From<&str> for SignerAddress {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

impl AsRef<str> for SignerAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn case_is_ignored() {
        let checksummed = SignerAddress::from(CHECKSUMMED);
        let lower = SignerAddress::from(CHECKSUMMED.to_lowercase());
        let upper = SignerAddress::from(format!("0x{}", &CHECKSUMMED[2..].to_uppercase()));

        assert!(checksummed.matches(&lower));
        assert_eq!(checksummed, upper);
        assert_eq!(lower, upper);
    }

    #[test]
    fn suffix_breaks_equality() {
        let address = SignerAddress::from(CHECKSUMMED);
        let longer = SignerAddress::from(format!("{CHECKSUMMED}1"));
        assert_ne!(address, longer);
        assert!(!longer.is_well_formed());
    }

    #[test]
    fn non_ascii_case_folding_is_not_applied() {
        // locale independent: only ASCII letters fold
        assert_ne!(SignerAddress::from("0xß"), SignerAddress::from("0xSS"));
    }

    #[test]
    fn hash_agrees_with_eq() {
        let mut set = HashSet::new();
        set.insert(SignerAddress::from(CHECKSUMMED));
        assert!(set.contains(&SignerAddress::from(CHECKSUMMED.to_lowercase())));
    }

    #[test]
    fn shape_check() {
        assert!(SignerAddress::from(CHECKSUMMED).is_well_formed());
        assert!(!SignerAddress::from(&CHECKSUMMED[2..]).is_well_formed());
        assert!(!SignerAddress::from("0xzz").is_well_formed());
        assert!(!SignerAddress::from("").is_well_formed());
    }
}
