//! Serialization of transactions for signing and for broadcast.
//!
//! Two envelopes are supported:
//!  - legacy transactions with EIP-155 replay protection (`gas_price` set)
//!  - EIP-1559 dynamic-fee transactions, type `0x02` (`max_fee_per_gas` and
//!    `max_priority_fee_per_gas` set)

use alloy_consensus::SignableTransaction;
use alloy_consensus::TxEip1559;
use alloy_consensus::TxEnvelope;
use alloy_consensus::TxLegacy;
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_primitives::Signature;
use alloy_primitives::TxKind;
use alloy_primitives::U256;

use super::error::ProviderError;
use crate::models::signer_address::SignerAddress;
use crate::models::transaction_request::TransactionRequest;

/// a validated transaction awaiting a signature
#[derive(Debug, Clone)]
pub(crate) enum UnsignedTransaction {
    Legacy(TxLegacy),
    Eip1559(TxEip1559),
}

impl UnsignedTransaction {
    pub(crate) fn from_request(tx: &TransactionRequest) -> Result<Self, ProviderError> {
        let nonce = require(tx.nonce, "nonce")?;
        let gas_limit = require(tx.gas_limit, "gas_limit")?;
        let chain_id = require(tx.chain_id, "chain_id")?;
        if chain_id == 0 {
            return Err(invalid("chain_id must be positive"));
        }
        let to = match &tx.to {
            Some(address) => TxKind::Call(recipient(address)?),
            None => TxKind::Create,
        };
        let value = U256::from(tx.value);
        let input = Bytes::from(tx.data.clone());

        match (
            tx.gas_price,
            tx.max_fee_per_gas,
            tx.max_priority_fee_per_gas,
        ) {
            (Some(gas_price), None, None) => Ok(Self::Legacy(TxLegacy {
                chain_id: Some(chain_id),
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                input,
            })),
            (None, Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) => {
                if max_priority_fee_per_gas > max_fee_per_gas {
                    return Err(invalid("max_priority_fee_per_gas exceeds max_fee_per_gas"));
                }
                Ok(Self::Eip1559(TxEip1559 {
                    chain_id,
                    nonce,
                    gas_limit,
                    max_fee_per_gas,
                    max_priority_fee_per_gas,
                    to,
                    value,
                    access_list: Default::default(),
                    input,
                }))
            }
            (None, None, None) => Err(invalid("no fee given")),
            _ => Err(invalid(
                "give either gas_price, or both max_fee_per_gas and max_priority_fee_per_gas",
            )),
        }
    }

    /// the digest to sign
    pub(crate) fn signing_hash(&self) -> [u8; 32] {
        match self {
            Self::Legacy(tx) => tx.signature_hash().0,
            Self::Eip1559(tx) => tx.signature_hash().0,
        }
    }

    /// the broadcastable transaction, given the signature over
    /// [`Self::signing_hash`]
    pub(crate) fn encode_signed(self, y_parity: bool, r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
        let signature = Signature::new(U256::from_be_bytes(*r), U256::from_be_bytes(*s), y_parity);
        let envelope: TxEnvelope = match self {
            Self::Legacy(tx) => tx.into_signed(signature).into(),
            Self::Eip1559(tx) => tx.into_signed(signature).into(),
        };
        envelope.encoded_2718()
    }
}

fn require<T>(field: Option<T>, name: &str) -> Result<T, ProviderError> {
    field.ok_or_else(|| invalid(&format!("missing {name}")))
}

fn invalid(reason: &str) -> ProviderError {
    ProviderError::InvalidTransaction(reason.to_string())
}

fn recipient(address: &SignerAddress) -> Result<Address, ProviderError> {
    if !address.is_well_formed() {
        return Err(invalid(&format!("recipient {address} is not an address")));
    }
    address
        .as_str()
        .parse()
        .map_err(|e| invalid(&format!("recipient {address}: {e}")))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn eip155_example() -> TransactionRequest {
        TransactionRequest::new()
            .nonce(9)
            .gas_price(20_000_000_000)
            .gas_limit(21_000)
            .to("0x3535353535353535353535353535353535353535")
            .value(1_000_000_000_000_000_000)
            .chain_id(1)
    }

    #[test]
    fn eip155_signing_payload_and_hash() {
        let unsigned = UnsignedTransaction::from_request(&eip155_example()).unwrap();
        let UnsignedTransaction::Legacy(tx) = &unsigned else {
            panic!("expected a legacy transaction");
        };
        assert_eq!(
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080",
            hex::encode(tx.encoded_for_signing())
        );
        assert_eq!(
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53",
            hex::encode(unsigned.signing_hash())
        );
    }

    #[test]
    fn legacy_v_carries_chain_id() {
        let unsigned = UnsignedTransaction::from_request(&eip155_example()).unwrap();
        let signed = unsigned.encode_signed(false, &[1; 32], &[2; 32]);
        // v = 1 * 2 + 35 = 37 = 0x25, right after the empty data field
        let data_then_v = [0x80, 0x25, 0xa0];
        assert!(signed.windows(3).any(|w| w == data_then_v));
    }

    #[test]
    fn eip1559_is_typed() {
        let tx = TransactionRequest::new()
            .nonce(0)
            .gas_limit(21_000)
            .eip1559_fees(30_000_000_000, 1_000_000_000)
            .to("0x3535353535353535353535353535353535353535")
            .value(1)
            .chain_id(1);
        let unsigned = UnsignedTransaction::from_request(&tx).unwrap();
        let UnsignedTransaction::Eip1559(inner) = &unsigned else {
            panic!("expected an EIP-1559 transaction");
        };
        assert_eq!(0x02, inner.encoded_for_signing()[0]);
        assert_eq!(0x02, unsigned.encode_signed(true, &[1; 32], &[2; 32])[0]);
    }

    #[test]
    fn contract_creation_has_no_recipient() {
        let mut tx = eip155_example();
        tx.to = None;
        tx.data = vec![0x60, 0x00];
        let Ok(UnsignedTransaction::Legacy(legacy)) = UnsignedTransaction::from_request(&tx)
        else {
            panic!("expected a legacy transaction");
        };
        assert_eq!(TxKind::Create, legacy.to);
    }

    #[test]
    fn missing_or_conflicting_fields_are_rejected() {
        let mut missing_nonce = eip155_example();
        missing_nonce.nonce = None;

        let mut missing_chain = eip155_example();
        missing_chain.chain_id = None;

        let mut zero_chain = eip155_example();
        zero_chain.chain_id = Some(0);

        let both_fee_models = eip155_example().eip1559_fees(2, 1);

        let mut no_fee = eip155_example();
        no_fee.gas_price = None;

        let mut half_eip1559 = no_fee.clone();
        half_eip1559.max_fee_per_gas = Some(2);

        let inverted_fees = no_fee.clone().eip1559_fees(1, 2);

        let bad_recipient = eip155_example().to("0x35");

        for tx in [
            missing_nonce,
            missing_chain,
            zero_chain,
            both_fee_models,
            no_fee,
            half_eip1559,
            inverted_fees,
            bad_recipient,
        ] {
            let result = UnsignedTransaction::from_request(&tx);
            assert!(
                matches!(result, Err(ProviderError::InvalidTransaction(_))),
                "{tx:?}"
            );
        }
    }
}
