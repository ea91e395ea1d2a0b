//! Transport seam between the approval client and the signer.
//!
//! The client never talks HTTP itself. It hands a JSON body to a
//! [`SignerTransport`] and receives either the decoded reply or a
//! [`TransportError`] tagged with a [`TransportErrorCode`]. The code table
//! follows the error codes used by common HTTP clients so that transport
//! classification stays independent of the concrete client library.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Sends JSON requests to the signer.
///
/// Implementations must be safe to share between concurrent calls: the client
/// holds one transport for its whole lifetime and never locks around it.
pub trait SignerTransport: Send + Sync {
    /// Posts `body` as JSON to `url` and returns the decoded JSON reply.
    ///
    /// Non-success HTTP statuses are reported as a [`TransportError`] whose
    /// `body` holds the reply, when it was valid JSON.
    fn post_json<B>(
        &self,
        url: &Url,
        body: &B,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send
    where
        B: Serialize + Sync + ?Sized;
}

impl<T: SignerTransport> SignerTransport for Arc<T> {
    async fn post_json<B>(&self, url: &Url, body: &B) -> Result<Value, TransportError>
    where
        B: Serialize + Sync + ?Sized,
    {
        (**self).post_json(url, body).await
    }
}

/// Error codes a transport can attach to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorCode {
    /// `ECONNREFUSED`
    ConnectionRefused,
    /// `ERR_FR_TOO_MANY_REDIRECTS`
    TooManyRedirects,
    /// `ERR_BAD_OPTION_VALUE`
    BadOptionValue,
    /// `ERR_BAD_OPTION`
    BadOption,
    /// `ERR_NETWORK`
    Network,
    /// `ERR_DEPRECATED`
    Deprecated,
    /// `ERR_BAD_RESPONSE`
    BadResponse,
    /// `ERR_BAD_REQUEST`
    BadRequest,
    /// `ERR_CANCELED`
    Canceled,
    /// `ECONNABORTED`
    Aborted,
    /// `ETIMEDOUT`
    Timeout,
}

impl TransportErrorCode {
    /// All known codes.
    pub const ALL: [Self; 11] = [
        Self::ConnectionRefused,
        Self::TooManyRedirects,
        Self::BadOptionValue,
        Self::BadOption,
        Self::Network,
        Self::Deprecated,
        Self::BadResponse,
        Self::BadRequest,
        Self::Canceled,
        Self::Aborted,
        Self::Timeout,
    ];

    /// Returns the wire form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionRefused => "ECONNREFUSED",
            Self::TooManyRedirects => "ERR_FR_TOO_MANY_REDIRECTS",
            Self::BadOptionValue => "ERR_BAD_OPTION_VALUE",
            Self::BadOption => "ERR_BAD_OPTION",
            Self::Network => "ERR_NETWORK",
            Self::Deprecated => "ERR_DEPRECATED",
            Self::BadResponse => "ERR_BAD_RESPONSE",
            Self::BadRequest => "ERR_BAD_REQUEST",
            Self::Canceled => "ERR_CANCELED",
            Self::Aborted => "ECONNABORTED",
            Self::Timeout => "ETIMEDOUT",
        }
    }
}

impl fmt::Display for TransportErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown transport error code.
#[derive(Debug, thiserror::Error)]
#[error("Unknown transport error code {0}")]
pub struct UnknownTransportErrorCode(String);

impl FromStr for TransportErrorCode {
    type Err = UnknownTransportErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownTransportErrorCode(s.to_owned()))
    }
}

/// A failure reported by a [`SignerTransport`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}{message}", code_prefix(.code.as_ref()))]
pub struct TransportError {
    /// The error code, when the transport could determine one.
    pub code: Option<TransportErrorCode>,
    /// Human-readable description of the failure.
    pub message: String,
    /// HTTP status of the reply, if one was received.
    pub status: Option<u16>,
    /// JSON body of the reply, if one was received and decoded.
    pub body: Option<Value>,
}

impl TransportError {
    /// Creates a transport error with a known code.
    #[must_use]
    pub fn new(code: TransportErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Creates a transport error the transport could not attach a code to.
    #[must_use]
    pub fn uncoded(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Sets the HTTP status of the reply.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the decoded reply body.
    #[must_use]
    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }
}

fn code_prefix(code: Option<&TransportErrorCode>) -> String {
    code.map(|code| format!("{code}: ")).unwrap_or_default()
}
