//! Ethereum conventions applied to secp256k1 keys: EIP-191 message digests
//! and EIP-55 checksummed addresses.

use alloy_primitives::eip191_hash_message;
use alloy_primitives::Address;
use secp256k1::PublicKey;

use crate::models::signer_address::SignerAddress;

/// digest signed by `personal_sign`: Keccak-256 over the EIP-191 prefix,
/// the decimal message length and the message
pub(crate) fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    eip191_hash_message(message).0
}

pub(crate) fn signer_address(address: Address) -> SignerAddress {
    SignerAddress::new(address.to_checksum(None))
}

pub(crate) fn address_of(public_key: &PublicKey) -> SignerAddress {
    // drop the 0x04 tag of the uncompressed encoding
    let uncompressed = public_key.serialize_uncompressed();
    signer_address(Address::from_raw_public_key(&uncompressed[1..]))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use alloy_primitives::keccak256;
    use secp256k1::Secp256k1;
    use secp256k1::SecretKey;

    use super::*;

    #[test]
    fn eip55_reference_vectors() {
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let lower: Address = expected.to_lowercase().parse().unwrap();
            assert_eq!(expected, signer_address(lower).as_str());
        }
    }

    #[test]
    fn address_of_known_secret_keys() {
        let secp = Secp256k1::new();
        let mut one = [0u8; 32];
        one[31] = 1;
        for (secret, expected) in [
            ([0x46u8; 32], "0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F"),
            (one, "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"),
        ] {
            let sk = SecretKey::from_slice(&secret).unwrap();
            let pk = PublicKey::from_secret_key(&secp, &sk);
            assert_eq!(expected, address_of(&pk).as_str());
        }
    }

    #[test]
    fn personal_message_hash_carries_length_prefix() {
        assert_ne!(personal_message_hash(b"1hello"), personal_message_hash(b"hello"));
        assert_eq!(
            keccak256(b"\x19Ethereum Signed Message:\n5hello").0,
            personal_message_hash(b"hello")
        );
    }
}
