//! Protocol generations spoken by the Venn signer.
//!
//! Both generations share the same call contract (one POST, a status-tagged
//! reply) but differ in where the request goes, which routing fields it
//! carries and what an approved reply contains. A [`Protocol`] captures those
//! differences so a single [`VennClient`](crate::client::VennClient) serves
//! either generation.
//!
//! - [`LegacyProtocol`] - the configured URL is the sign endpoint; the signer
//!   returns the transaction to broadcast.
//! - [`FirewallProtocol`] - requests go to `services/firewall/sign` under the
//!   base URL; the signer returns an approval that is ABI-encoded into a
//!   `safeFunctionCall` wrapper.

use alloy_primitives::Address;
use serde_json::Value;
use url::Url;

use crate::encoder::{CallEncoder, TransactionEncoder};
use crate::error::VennError;
use crate::types::{ApprovalRequest, ApprovedCallsPayload, TransactionRequest};

/// Path segments of the firewall sign endpoint.
pub const FIREWALL_SIGN_PATH: [&str; 3] = ["services", "firewall", "sign"];

/// Path segments of the operator endpoint used for inspection.
pub const SIGNER_PATH: [&str; 1] = ["signer"];

/// Request building and reply handling for one protocol generation.
pub trait Protocol: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the client configuration must carry a chain identifier.
    fn requires_chain_id(&self) -> bool {
        false
    }

    /// Resolves the sign endpoint from the configured URL.
    ///
    /// Returns `None` if `base` cannot carry a path.
    fn sign_url(&self, base: &Url) -> Option<Url>;

    /// Builds the body posted to the sign endpoint.
    fn build_request(
        &self,
        tx: &TransactionRequest,
        policy_address: Address,
        chain_id: Option<u64>,
    ) -> ApprovalRequest;

    /// Turns the `data` of an approved reply into the transaction to return.
    ///
    /// # Errors
    ///
    /// Returns [`VennError::InvalidResponse`] if `data` has the wrong shape, or
    /// an encoding error if the protocol re-encodes the approval.
    fn finalize(&self, tx: &TransactionRequest, data: Value)
    -> Result<TransactionRequest, VennError>;
}

/// Appends `segments` to the path of `base`.
///
/// Returns `None` for URLs that cannot be a base, such as `mailto:` URLs.
#[must_use]
pub fn endpoint(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
    Some(url)
}

/// The first signer generation.
///
/// The request carries the chain identifier from the configuration and the
/// approved reply's `data` is the transaction itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyProtocol {
    mock_approval: Option<bool>,
}

impl LegacyProtocol {
    /// Creates the legacy protocol.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mock_approval: None,
        }
    }

    /// Sets the `mockApproval` flag understood by legacy test signers.
    #[must_use]
    pub const fn with_mock_approval(mut self, mock_approval: bool) -> Self {
        self.mock_approval = Some(mock_approval);
        self
    }
}

impl Protocol for LegacyProtocol {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn requires_chain_id(&self) -> bool {
        true
    }

    fn sign_url(&self, base: &Url) -> Option<Url> {
        Some(base.clone())
    }

    fn build_request(
        &self,
        tx: &TransactionRequest,
        policy_address: Address,
        chain_id: Option<u64>,
    ) -> ApprovalRequest {
        let mut transaction = tx.clone();
        transaction.chain_id = chain_id.or(tx.chain_id);
        ApprovalRequest {
            transaction,
            approving_policy_address: policy_address,
            mock_approval: self.mock_approval,
        }
    }

    fn finalize(
        &self,
        _tx: &TransactionRequest,
        data: Value,
    ) -> Result<TransactionRequest, VennError> {
        serde_json::from_value(data).map_err(|e| VennError::InvalidResponse {
            context: "approved transaction",
            message: e.to_string(),
        })
    }
}

/// The current signer generation, backed by the on-chain firewall.
///
/// An approved reply carries an [`ApprovedCallsPayload`], which the encoder
/// wraps together with the original call data into a `safeFunctionCall` on the
/// original target.
#[derive(Debug, Clone, Default)]
pub struct FirewallProtocol<E> {
    encoder: TransactionEncoder<E>,
}

impl<E: CallEncoder> FirewallProtocol<E> {
    /// Creates the firewall protocol over an ABI encoder.
    pub const fn new(encoder: E) -> Self {
        Self {
            encoder: TransactionEncoder::new(encoder),
        }
    }

    /// Returns the transaction encoder.
    pub const fn encoder(&self) -> &TransactionEncoder<E> {
        &self.encoder
    }
}

impl<E: CallEncoder> Protocol for FirewallProtocol<E> {
    fn name(&self) -> &'static str {
        "firewall"
    }

    fn sign_url(&self, base: &Url) -> Option<Url> {
        endpoint(base, &FIREWALL_SIGN_PATH)
    }

    fn build_request(
        &self,
        tx: &TransactionRequest,
        policy_address: Address,
        _chain_id: Option<u64>,
    ) -> ApprovalRequest {
        ApprovalRequest {
            transaction: tx.clone(),
            approving_policy_address: policy_address,
            mock_approval: None,
        }
    }

    fn finalize(
        &self,
        tx: &TransactionRequest,
        data: Value,
    ) -> Result<TransactionRequest, VennError> {
        let approval: ApprovedCallsPayload =
            serde_json::from_value(data).map_err(|e| VennError::InvalidResponse {
                context: "approved calls payload",
                message: e.to_string(),
            })?;
        self.encoder.wrap(tx, &approval)
    }
}
