//! Solidity ABI encoding of the firewall calls.
//!
//! Payload fields arrive as the strings the signer sent. They are converted to
//! their ABI types here, so a malformed field surfaces as an encoding failure
//! of the stage that needed it.

use std::str::FromStr;

use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::SolCall;
use venn::encoder::CallEncoder;
use venn::types::{ApprovedCallsPayload, SafeFunctionCallPayload};

use crate::contract::{IFirewallConsumer, ISecurityValidator};

/// Errors that can occur while converting payload fields to ABI values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A call hash is not 32 bytes of hex.
    #[error("Invalid call hash at index {index}: {message}")]
    CallHash {
        /// Position of the hash in `callHashes`.
        index: usize,
        /// Parser message.
        message: String,
    },
    /// A scalar field could not be parsed.
    #[error("Invalid {field}: {message}")]
    InvalidField {
        /// Wire name of the field.
        field: &'static str,
        /// Parser message.
        message: String,
    },
}

impl EncodeError {
    fn field(field: &'static str, error: impl ToString) -> Self {
        Self::InvalidField {
            field,
            message: error.to_string(),
        }
    }
}

/// [`CallEncoder`] producing standard Solidity ABI call data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolCallEncoder;

impl CallEncoder for SolCallEncoder {
    type Error = EncodeError;

    fn encode_approved_calls(&self, payload: &ApprovedCallsPayload) -> Result<Bytes, EncodeError> {
        let call_hashes = payload
            .call_hashes
            .iter()
            .enumerate()
            .map(|(index, hash)| {
                B256::from_str(hash).map_err(|e| EncodeError::CallHash {
                    index,
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let expiration = U256::from_str(payload.expiration.trim())
            .map_err(|e| EncodeError::field("expiration", e))?;
        let tx_origin =
            Address::from_str(&payload.tx_origin).map_err(|e| EncodeError::field("txOrigin", e))?;
        let signature =
            Bytes::from_str(&payload.signature).map_err(|e| EncodeError::field("signature", e))?;

        let call = ISecurityValidator::approveCallsViaSignatureCall {
            callHashes: call_hashes,
            expiration,
            txOrigin: tx_origin,
            nonce: U256::from(payload.nonce),
            signature,
        };
        Ok(call.abi_encode().into())
    }

    fn encode_safe_function_call(
        &self,
        payload: &SafeFunctionCallPayload,
    ) -> Result<Bytes, EncodeError> {
        let target = Address::from_str(&payload.target).map_err(|e| EncodeError::field("target", e))?;

        let call = IFirewallConsumer::safeFunctionCallCall {
            target,
            targetPayload: payload.target_payload.clone(),
            data: payload.data.clone(),
        };
        Ok(call.abi_encode().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    const MOCKED_TX_DATA: &str = "0x2ebd2116000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc20000000000000000000000009a5cd1145791b29ac4e68df3bf8e30d2167daa76000000000000000000000000a150a825d425b36329d8294eef8bd0fe68f8f6e000000000000000000000000067c5870b4a41d4ebef24d2456547a03f1f3e094b0000000000000000000000000c6c80d2061afa35e160f3799411d83bdeea0a5a000000000000000000000000000000000000000000000000000004a15724a9fd";

    /// ABI encoding of `("test string", 0x6738fA889fF31F82d9Fe8862ec025dbE318f3Fde)`.
    const TARGET_PAYLOAD: &str = "0x00000000000000000000000000000000000000000000000000000000000000400000000000000000000000006738fa889ff31f82d9fe8862ec025dbe318f3fde000000000000000000000000000000000000000000000000000000000000000b7465737420737472696e67000000000000000000000000000000000000000000";

    const SAFE_FUNCTION_CALL: &str = "0x1a8828f4000000000000000000000000f06ab383528f51da67e2b2407327731770156ed600000000000000000000000000000000000000000000000000000000000000600000000000000000000000000000000000000000000000000000000000000100000000000000000000000000000000000000000000000000000000000000008000000000000000000000000000000000000000000000000000000000000000400000000000000000000000006738fa889ff31f82d9fe8862ec025dbe318f3fde000000000000000000000000000000000000000000000000000000000000000b7465737420737472696e6700000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000c42ebd2116000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc20000000000000000000000009a5cd1145791b29ac4e68df3bf8e30d2167daa76000000000000000000000000a150a825d425b36329d8294eef8bd0fe68f8f6e000000000000000000000000067c5870b4a41d4ebef24d2456547a03f1f3e094b0000000000000000000000000c6c80d2061afa35e160f3799411d83bdeea0a5a000000000000000000000000000000000000000000000000000004a15724a9fd00000000000000000000000000000000000000000000000000000000";

    const APPROVED_CALLS: &str = "0x0c908cff00000000000000000000000000000000000000000000000000000000000000a00000000000000000000000000000000000000000000000000000000066b4cea10000000000000000000000006738fa889ff31f82d9fe8862ec025dbe318f3fde000000000000000000000000000000000000000000000000000000000000000100000000000000000000000000000000000000000000000000000000000000e0000000000000000000000000000000000000000000000000000000000000000130780000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";

    fn approval() -> ApprovedCallsPayload {
        ApprovedCallsPayload {
            call_hashes: vec![format!("0x3078{}", "0".repeat(60))],
            expiration: "1723125409".into(),
            tx_origin: "0x6738fA889fF31F82d9Fe8862ec025dbE318f3Fde".into(),
            nonce: 1,
            signature: "0x".into(),
        }
    }

    fn safe_call() -> SafeFunctionCallPayload {
        SafeFunctionCallPayload {
            target: "0xF06Ab383528F51dA67E2b2407327731770156ED6".into(),
            target_payload: Bytes::from_str(TARGET_PAYLOAD).unwrap(),
            data: Bytes::from_str(MOCKED_TX_DATA).unwrap(),
        }
    }

    #[test]
    fn test_selectors() {
        assert_eq!(
            ISecurityValidator::approveCallsViaSignatureCall::SELECTOR,
            hex!("0c908cff")
        );
        assert_eq!(IFirewallConsumer::safeFunctionCallCall::SELECTOR, hex!("1a8828f4"));
    }

    #[test]
    fn test_encode_approved_calls() {
        let encoded = SolCallEncoder.encode_approved_calls(&approval()).unwrap();
        assert_eq!(encoded, Bytes::from_str(APPROVED_CALLS).unwrap());
    }

    #[test]
    fn test_encode_approved_calls_accepts_hex_expiration() {
        let mut hex_expiration = approval();
        hex_expiration.expiration = "0x66b4cea1".into();
        assert_eq!(
            SolCallEncoder.encode_approved_calls(&hex_expiration).unwrap(),
            SolCallEncoder.encode_approved_calls(&approval()).unwrap()
        );
    }

    #[test]
    fn test_encode_safe_function_call() {
        let encoded = SolCallEncoder.encode_safe_function_call(&safe_call()).unwrap();
        assert_eq!(encoded, Bytes::from_str(SAFE_FUNCTION_CALL).unwrap());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let first = SolCallEncoder.encode_safe_function_call(&safe_call()).unwrap();
        let second = SolCallEncoder.encode_safe_function_call(&safe_call()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_fields() {
        let mut bad_hash = approval();
        bad_hash.call_hashes.push("0x1234".into());
        assert!(matches!(
            SolCallEncoder.encode_approved_calls(&bad_hash),
            Err(EncodeError::CallHash { index: 1, .. })
        ));

        let mut bad_expiration = approval();
        bad_expiration.expiration = "tomorrow".into();
        assert!(matches!(
            SolCallEncoder.encode_approved_calls(&bad_expiration),
            Err(EncodeError::InvalidField { field: "expiration", .. })
        ));

        let mut bad_origin = approval();
        bad_origin.tx_origin = "0x1234".into();
        assert!(matches!(
            SolCallEncoder.encode_approved_calls(&bad_origin),
            Err(EncodeError::InvalidField { field: "txOrigin", .. })
        ));

        let mut bad_signature = approval();
        bad_signature.signature = "0xzz".into();
        assert!(matches!(
            SolCallEncoder.encode_approved_calls(&bad_signature),
            Err(EncodeError::InvalidField { field: "signature", .. })
        ));

        let mut bad_target = safe_call();
        bad_target.target = "invalid-address".into();
        assert!(matches!(
            SolCallEncoder.encode_safe_function_call(&bad_target),
            Err(EncodeError::InvalidField { field: "target", .. })
        ));
    }

    #[test]
    fn test_firewall_protocol_wraps_with_sol_encoder() {
        use venn::TransactionRequest;
        use venn::protocol::Protocol;

        let original = TransactionRequest::new(
            Address::from_str("0x6738fA889fF31F82d9Fe8862ec025dbE318f3Fde").unwrap(),
            Address::from_str("0xF06Ab383528F51dA67E2b2407327731770156ED6").unwrap(),
        )
        .with_data(Bytes::from_str(MOCKED_TX_DATA).unwrap());
        let data = serde_json::json!({
            "callHashes": approval().call_hashes,
            "expiration": 1_723_125_409,
            "txOrigin": approval().tx_origin,
            "nonce": 1,
            "signature": "0x",
        });

        let wrapped = crate::firewall_protocol().finalize(&original, data).unwrap();
        let approved_calls = SolCallEncoder.encode_approved_calls(&approval()).unwrap();
        let expected = SolCallEncoder
            .encode_safe_function_call(&SafeFunctionCallPayload {
                target: original.to.to_string(),
                target_payload: approved_calls,
                data: original.data.clone(),
            })
            .unwrap();
        assert_eq!(wrapped.data, expected);
        assert_eq!(wrapped.to, original.to);
    }
}
