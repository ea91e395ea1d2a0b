//! Wire format types exchanged with the Venn signer.
//!
//! All types serialize to the camelCase JSON the signer expects. Amounts are
//! carried as [`Wei`], which serializes as a decimal string so that values
//! beyond 2^53 survive JSON round trips through JavaScript services.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// An amount of native currency in wei.
///
/// # Serialization
///
/// Serialized as a decimal string. Deserializes from a decimal string, a
/// `0x`-prefixed hex string or a JSON integer.
///
/// ```json
/// "1000000000000000000"
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wei(pub U256);

impl Wei {
    /// Zero wei.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Returns the underlying integer.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<U256> for Wei {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for Wei {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl Display for Wei {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Wei {
    type Err = alloy_primitives::ruint::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str(s.trim()).map(Self)
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s
                .parse()
                .map_err(|_| serde::de::Error::custom("value must be a non-negative integer")),
            StringOrNumber::Number(n) => Ok(Self::from(n)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

/// Accepts either a JSON string or a JSON integer and keeps it as a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

/// A transaction the caller wants the signer to approve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Sender address.
    pub from: Address,
    /// Recipient (target contract) address.
    pub to: Address,
    /// Native value sent with the call.
    #[serde(default)]
    pub value: Wei,
    /// Call data.
    #[serde(default)]
    pub data: Bytes,
    /// Target chain, when the caller knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl TransactionRequest {
    /// Creates a zero-value transaction without call data.
    #[must_use]
    pub fn new(from: Address, to: Address) -> Self {
        Self {
            from,
            to,
            value: Wei::ZERO,
            data: Bytes::new(),
            chain_id: None,
        }
    }

    /// Sets the native value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Wei>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the call data.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Sets the target chain.
    #[must_use]
    pub const fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }
}

/// The body posted to the signer's sign endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    /// The transaction under evaluation.
    #[serde(flatten)]
    pub transaction: TransactionRequest,
    /// Address of the policy contract the signer evaluates against.
    pub approving_policy_address: Address,
    /// Asks legacy test signers to approve unconditionally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_approval: Option<bool>,
}

/// The signer's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// The transaction passed the policy.
    Approved,
    /// The policy rejected the transaction.
    Rejected,
    /// The signer failed to evaluate the transaction.
    Error,
    /// Any status this client does not know.
    #[serde(other)]
    Unknown,
}

/// A reply from the signer's sign endpoint.
///
/// `data` is only meaningful when `status` is [`TxStatus::Approved`]; its
/// shape depends on the protocol generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerResponse<T = Value> {
    /// Identifier the signer assigned to the request.
    #[serde(default)]
    pub request_id: String,
    /// The verdict.
    pub status: TxStatus,
    /// Protocol-specific payload.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Human-readable explanation, usually present on rejections and errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The signer's approval as returned by the firewall protocol.
///
/// Fields are kept in their wire form; they are parsed while ABI-encoding
/// so that malformed values surface as an encoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedCallsPayload {
    /// Hashes of the calls the signer approved, as 32-byte hex strings.
    pub call_hashes: Vec<String>,
    /// Unix timestamp after which the approval is void.
    #[serde(deserialize_with = "string_or_number")]
    pub expiration: String,
    /// The account expected as `tx.origin` when the approval is consumed.
    pub tx_origin: String,
    /// Replay-protection nonce.
    pub nonce: u64,
    /// The signer's signature over the approval, as hex.
    pub signature: String,
}

/// Arguments of a firewall consumer's `safeFunctionCall`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeFunctionCallPayload {
    /// The contract receiving the approval call.
    pub target: String,
    /// Encoded approval call forwarded to `target`.
    pub target_payload: Bytes,
    /// The original call data.
    pub data: Bytes,
}

/// Body of an inspection request to the operator endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectTxPayload {
    /// Caller-chosen identifier echoed back by the signer.
    pub request_id: String,
    /// Target chain.
    pub chain_id: u64,
    /// Sender address.
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Call data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// Native value sent with the call.
    #[serde(default)]
    pub value: Wei,
    /// Only evaluate the transaction, do not produce a signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspect_only: Option<bool>,
}

/// Outcome of an inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectTxResponse {
    /// The request identifier from [`InspectTxPayload::request_id`].
    pub request_id: String,
    /// Aggregated verdict.
    pub approved: bool,
    /// Per-operator verdicts.
    #[serde(default)]
    pub metadata: Vec<OperatorResult>,
}

/// A single operator's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorResult {
    /// Operator identifier.
    pub operator: String,
    /// The operator's verdict.
    pub approved: bool,
    /// The operator's signature share, when it approved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureData>,
}

/// An aggregated BLS signature point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureData {
    /// X coordinate.
    pub x: String,
    /// Y coordinate.
    pub y: String,
}

/// Outcome of an inspection that also produced a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTxResponse {
    /// The inspection outcome.
    #[serde(flatten)]
    pub inspection: InspectTxResponse,
    /// The aggregated signature.
    pub signature: SignatureData,
}
