use serde::Deserialize;
use serde::Serialize;

use super::signer_address::SignerAddress;

/// An unsigned transaction as handed to the signer.
///
/// The wallet manager passes this through untouched. Which fields must be
/// present, and what they must contain, is decided by the provider that
/// signs it.
///
/// Amounts are in wei.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionRequest {
    /// recipient. `None` for contract creation.
    pub to: Option<SignerAddress>,
    pub value: u128,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    pub nonce: Option<u64>,
    pub gas_limit: Option<u64>,

    /// legacy (EIP-155) fee
    pub gas_price: Option<u128>,

    /// EIP-1559 fees
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,

    pub chain_id: Option<u64>,
}

impl TransactionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, to: impl Into<SignerAddress>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn eip1559_fees(mut self, max_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> Self {
        self.max_fee_per_gas = Some(max_fee_per_gas);
        self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

mod hex_bytes {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        let digits = text.strip_prefix("0x").unwrap_or(&text);
        hex::decode(digits).map_err(serde::de::Error::custom)
    }
}
