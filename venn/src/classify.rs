//! Maps failed signer calls onto the [`VennError`] taxonomy.
//!
//! Two classifiers run in a fixed order:
//!
//! 1. [`classify_transport`] looks at transport failures and maps their
//!    [`TransportErrorCode`] through a fixed table.
//! 2. [`classify_reply`] looks for a signer reply body (from a non-approved
//!    success reply or attached to a transport failure) and classifies it by
//!    its `status` and `message` fields.
//!
//! Replies that already decoded as a typed
//! [`SignerResponse`](crate::types::SignerResponse) skip the shape check and
//! go through [`classify_verdict`], so a verdict without a `message` is still
//! recognised.
//!
//! The signer's reply contract is weakly typed and has changed shape between
//! protocol generations, so replies are recognised structurally by
//! [`ReplyShape::of`]. A failure neither classifier recognises is returned
//! unchanged as [`VennError::Unclassified`].

use serde_json::Value;

use crate::error::VennError;
use crate::transport::{TransportError, TransportErrorCode};
use crate::types::TxStatus;

/// A failed signer call before classification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignerFailure {
    /// The transport reported a failure.
    #[error(transparent)]
    Transport(TransportError),
    /// The signer answered successfully but did not approve the transaction.
    #[error("Signer did not approve the transaction: {0}")]
    Reply(Value),
}

impl SignerFailure {
    /// The reply body attached to this failure, if there is one.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Transport(error) => error.body.as_ref(),
            Self::Reply(body) => Some(body),
        }
    }
}

impl From<TransportError> for SignerFailure {
    fn from(error: TransportError) -> Self {
        Self::Transport(error)
    }
}

/// The structural reading of a reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyShape<'a> {
    /// The body carries both `status` and `message`.
    Server {
        /// The `status` field, when it is a string.
        status: Option<&'a str>,
        /// The `message` field rendered as text.
        message: String,
    },
    /// The body does not look like a signer reply.
    Unrecognized,
}

impl<'a> ReplyShape<'a> {
    /// Reads the shape of `body`.
    ///
    /// Only the presence of the `message` and `status` keys is required. A
    /// `null` message reads as empty, other non-string messages are rendered
    /// as JSON.
    #[must_use]
    pub fn of(body: &'a Value) -> Self {
        let Some(object) = body.as_object() else {
            return Self::Unrecognized;
        };
        let (Some(message), Some(status)) = (object.get("message"), object.get("status")) else {
            return Self::Unrecognized;
        };
        let message = match message {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Self::Server {
            status: status.as_str(),
            message,
        }
    }
}

/// Classifies a transport failure by its error code.
///
/// Returns `None` when `failure` is not a transport failure or its code is not
/// in the table, so the reply classifier can run next.
#[must_use]
pub fn classify_transport(failure: &SignerFailure) -> Option<VennError> {
    let SignerFailure::Transport(error) = failure else {
        return None;
    };
    let message = Some(error.message.clone());
    match error.code? {
        TransportErrorCode::ConnectionRefused => Some(VennError::ConnectionRefused(message)),
        TransportErrorCode::Network => Some(VennError::Network(message)),
        TransportErrorCode::Timeout => Some(VennError::Timeout(message)),
        TransportErrorCode::Aborted => Some(VennError::Aborted(message)),
        TransportErrorCode::BadRequest => Some(VennError::BadRequest(message)),
        _ => None,
    }
}

/// Classifies the signer reply carried by `failure`.
///
/// # Errors
///
/// Returns `failure` unchanged when it carries no body shaped like a signer
/// reply.
pub fn classify_reply(failure: SignerFailure) -> Result<VennError, SignerFailure> {
    let classified = match failure.body().map(ReplyShape::of) {
        Some(ReplyShape::Server { status, message }) => Some(classify_status(status, message)),
        Some(ReplyShape::Unrecognized) | None => None,
    };
    classified.ok_or(failure)
}

/// Runs both classifiers in order and falls back to
/// [`VennError::Unclassified`].
#[must_use]
pub fn classify(failure: SignerFailure) -> VennError {
    if let Some(error) = classify_transport(&failure) {
        return error;
    }
    classify_reply(failure).unwrap_or_else(VennError::Unclassified)
}

/// Classifies a typed signer verdict that is not [`TxStatus::Approved`].
///
/// Unlike [`classify_reply`], no `message` is required: the status alone
/// selects the variant and the message is carried when present. An `Error`
/// without a message is [`VennError::Internal`].
#[must_use]
pub fn classify_verdict(status: TxStatus, message: Option<String>) -> VennError {
    match (status, message) {
        (TxStatus::Rejected, message) => VennError::TxRejected(message),
        (TxStatus::Error, Some(message)) => classify_server_message(message),
        (_, message) => VennError::Internal(message),
    }
}

fn classify_status(status: Option<&str>, message: String) -> VennError {
    match status {
        Some("Rejected") => VennError::TxRejected(Some(message)),
        Some("Error") => classify_server_message(message),
        _ => VennError::Internal(Some(message)),
    }
}

/// Classifies an error message reported by the signer.
///
/// Matching is a case-insensitive substring search, checked in order:
/// `policy`, `invalid request`, `monitored assets`. Anything else is
/// [`VennError::Internal`].
#[must_use]
pub fn classify_server_message(message: String) -> VennError {
    let lowered = message.to_lowercase();
    if lowered.contains("policy") {
        VennError::NoPolicyCallInTrace(Some(message))
    } else if lowered.contains("invalid request") {
        VennError::BadRequest(Some(message))
    } else if lowered.contains("monitored assets") {
        VennError::NoMonitoredAssets(Some(message))
    } else {
        VennError::Internal(Some(message))
    }
}
