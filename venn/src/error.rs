//! Error taxonomy for Venn approval calls.
//!
//! Every failure the client surfaces is one of the variants of [`VennError`].
//! Transport failures map 1:1 from [`TransportErrorCode`](crate::transport::TransportErrorCode),
//! signer verdicts are classified from the reply body, and encoding failures
//! come from the [`CallEncoder`](crate::encoder::CallEncoder) in use.

use crate::classify::SignerFailure;

/// Errors surfaced by the Venn approval client.
///
/// Most variants carry the human-readable message reported by the transport,
/// the signer or the encoder, when one was available.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VennError {
    /// The signer refused the connection.
    #[error("Connection refused{}", suffix(.0.as_deref()))]
    ConnectionRefused(Option<String>),

    /// The request could not reach the signer.
    #[error("Network error{}", suffix(.0.as_deref()))]
    Network(Option<String>),

    /// The transport gave up waiting for the signer.
    #[error("Request timed out{}", suffix(.0.as_deref()))]
    Timeout(Option<String>),

    /// The connection was aborted before a reply arrived.
    #[error("Request aborted{}", suffix(.0.as_deref()))]
    Aborted(Option<String>),

    /// The request was malformed.
    #[error("Bad request{}", suffix(.0.as_deref()))]
    BadRequest(Option<String>),

    /// The signer rejected the transaction.
    #[error("Transaction rejected{}", suffix(.0.as_deref()))]
    TxRejected(Option<String>),

    /// The transaction trace contains no call to the approving policy.
    #[error("No policy call in trace{}", suffix(.0.as_deref()))]
    NoPolicyCallInTrace(Option<String>),

    /// The policy does not monitor any asset touched by the transaction.
    #[error("No monitored assets{}", suffix(.0.as_deref()))]
    NoMonitoredAssets(Option<String>),

    /// The signer reported an error that matches no known reason.
    #[error("Internal signer error{}", suffix(.0.as_deref()))]
    Internal(Option<String>),

    /// The approval payload could not be ABI-encoded.
    #[error("Failed to encode approved calls{}", suffix(.0.as_deref()))]
    FailedToEncodeApprovedCalls(Option<String>),

    /// The safe function call wrapper could not be ABI-encoded.
    #[error("Failed to encode safe function call{}", suffix(.0.as_deref()))]
    FailedToEncodeSafeFunctionCall(Option<String>),

    /// The client configuration is missing a required value or is malformed.
    #[error("Invalid init params{}", suffix(.0.as_deref()))]
    InvalidInitParams(Option<String>),

    /// An approved reply carried data that does not match the protocol's payload.
    #[error("Invalid signer response: {context}: {message}")]
    InvalidResponse {
        /// What was being decoded.
        context: &'static str,
        /// The decoder's message.
        message: String,
    },

    /// A failure neither classifier recognised, propagated unchanged.
    #[error(transparent)]
    Unclassified(SignerFailure),
}

impl VennError {
    /// Returns the message carried by this error, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::ConnectionRefused(m)
            | Self::Network(m)
            | Self::Timeout(m)
            | Self::Aborted(m)
            | Self::BadRequest(m)
            | Self::TxRejected(m)
            | Self::NoPolicyCallInTrace(m)
            | Self::NoMonitoredAssets(m)
            | Self::Internal(m)
            | Self::FailedToEncodeApprovedCalls(m)
            | Self::FailedToEncodeSafeFunctionCall(m)
            | Self::InvalidInitParams(m) => m.as_deref(),
            Self::InvalidResponse { message, .. } => Some(message),
            Self::Unclassified(_) => None,
        }
    }

    /// Whether this error can come out of transport classification.
    ///
    /// `BadRequest` counts as a transport error even though the signer can
    /// also report it in a reply message.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRefused(_)
                | Self::Network(_)
                | Self::Timeout(_)
                | Self::Aborted(_)
                | Self::BadRequest(_)
        )
    }

    /// Whether this error concerns an approved payload that could not be turned
    /// into a valid transaction.
    ///
    /// These are never swallowed by non-strict mode.
    #[must_use]
    pub const fn is_payload_error(&self) -> bool {
        matches!(
            self,
            Self::FailedToEncodeApprovedCalls(_)
                | Self::FailedToEncodeSafeFunctionCall(_)
                | Self::InvalidResponse { .. }
        )
    }

    pub(crate) fn invalid_init(message: impl Into<String>) -> Self {
        Self::InvalidInitParams(Some(message.into()))
    }
}

fn suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}
