//! Two-stage encoding of a firewall-approved transaction.
//!
//! The signer's approval is delivered on-chain by wrapping the original call in
//! the firewall consumer's `safeFunctionCall`, which first forwards an
//! `approveCallsViaSignature` call to the security validator. The byte-level
//! ABI encoding is supplied by a [`CallEncoder`]; [`TransactionEncoder`] maps
//! its failures onto the error taxonomy and assembles the final transaction.

use alloy_primitives::Bytes;

use crate::error::VennError;
use crate::types::{ApprovedCallsPayload, SafeFunctionCallPayload, TransactionRequest};
use crate::validation::parse_address;

/// ABI encoder for the two firewall calls.
///
/// Argument order is part of the on-chain contract:
///
/// - `approveCallsViaSignature(callHashes, expiration, txOrigin, nonce, signature)`
/// - `safeFunctionCall(target, targetPayload, data)`
pub trait CallEncoder: Send + Sync {
    /// Encoding failure.
    type Error: std::error::Error;

    /// Encodes an `approveCallsViaSignature` call.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload field cannot be converted to its ABI type.
    fn encode_approved_calls(&self, payload: &ApprovedCallsPayload) -> Result<Bytes, Self::Error>;

    /// Encodes a `safeFunctionCall` call.
    ///
    /// # Errors
    ///
    /// Returns an error if a payload field cannot be converted to its ABI type.
    fn encode_safe_function_call(
        &self,
        payload: &SafeFunctionCallPayload,
    ) -> Result<Bytes, Self::Error>;
}

/// Wraps a [`CallEncoder`] and translates its failures into [`VennError`].
#[derive(Debug, Clone, Default)]
pub struct TransactionEncoder<E> {
    inner: E,
}

impl<E: CallEncoder> TransactionEncoder<E> {
    /// Creates a transaction encoder over `inner`.
    pub const fn new(inner: E) -> Self {
        Self { inner }
    }

    /// Returns the wrapped encoder.
    pub const fn inner(&self) -> &E {
        &self.inner
    }

    /// Encodes the approval payload.
    ///
    /// # Errors
    ///
    /// Returns [`VennError::FailedToEncodeApprovedCalls`] carrying the encoder's message.
    pub fn approved_calls(&self, payload: &ApprovedCallsPayload) -> Result<Bytes, VennError> {
        self.inner
            .encode_approved_calls(payload)
            .map_err(|e| VennError::FailedToEncodeApprovedCalls(Some(e.to_string())))
    }

    /// Encodes the safe function call wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`VennError::FailedToEncodeSafeFunctionCall`] carrying the encoder's message.
    pub fn safe_function_call(&self, payload: &SafeFunctionCallPayload) -> Result<Bytes, VennError> {
        self.inner
            .encode_safe_function_call(payload)
            .map_err(|e| VennError::FailedToEncodeSafeFunctionCall(Some(e.to_string())))
    }

    /// Builds the transaction that carries `approval` for `original` on-chain.
    ///
    /// The result keeps the original target and value, is sent from the
    /// approval's `txOrigin`, and calls `safeFunctionCall(original.to,
    /// approveCallsViaSignature(..), original.data)`.
    ///
    /// # Errors
    ///
    /// Returns one of the two encoding errors if either stage fails.
    pub fn wrap(
        &self,
        original: &TransactionRequest,
        approval: &ApprovedCallsPayload,
    ) -> Result<TransactionRequest, VennError> {
        let target_payload = self.approved_calls(approval)?;
        let tx_origin = parse_address(&approval.tx_origin).ok_or_else(|| {
            VennError::FailedToEncodeApprovedCalls(Some(format!(
                "invalid txOrigin {:?}",
                approval.tx_origin
            )))
        })?;
        let data = self.safe_function_call(&SafeFunctionCallPayload {
            target: original.to.to_string(),
            target_payload,
            data: original.data.clone(),
        })?;

        Ok(TransactionRequest {
            from: tx_origin,
            to: original.to,
            value: original.value,
            data,
            chain_id: original.chain_id,
        })
    }
}
