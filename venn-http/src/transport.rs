//! A [`SignerTransport`] that talks to the Venn signer over HTTP.
//!
//! [`HttpTransport`] posts JSON with `reqwest` and reports every failure as a
//! [`TransportError`] tagged with the code the error classifier expects:
//!
//! | Failure | Code |
//! |---|---|
//! | Request timed out | `ETIMEDOUT` |
//! | Connection refused | `ECONNREFUSED` |
//! | Connection reset or aborted | `ECONNABORTED` |
//! | Any other connect or send failure | `ERR_NETWORK` |
//! | Redirect limit exceeded | `ERR_FR_TOO_MANY_REDIRECTS` |
//! | Request could not be built | `ERR_BAD_OPTION` |
//! | 4xx status | `ERR_BAD_REQUEST` |
//! | 5xx status, unreadable or non-JSON reply | `ERR_BAD_RESPONSE` |
//!
//! Replies with a non-success status keep their JSON body on the error, so the
//! signer's own verdict can still be classified.

use std::error::Error as StdError;
use std::fmt::Display;
use std::io;
use std::time::Duration;

use http::{HeaderMap, StatusCode};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;
use venn::transport::{SignerTransport, TransportError, TransportErrorCode};

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

/// HTTP transport backed by a shared `reqwest` client.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    /// Shared Reqwest HTTP client
    client: Client,
    /// Custom headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport with a fresh `reqwest` client, no extra headers and
    /// no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `client` for all requests, sharing its connection pool.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns any custom headers configured on the transport.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the configured timeout, if any.
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl SignerTransport for HttpTransport {
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "venn.http.post", skip_all, fields(url = %url, timeout = ?self.timeout))
    )]
    async fn post_json<B>(&self, url: &Url, body: &B) -> Result<Value, TransportError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let mut req = self.client.post(url.clone()).json(body);
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let result = match req.send().await {
            Ok(response) => read_reply(response).await,
            Err(e) => Err(from_reqwest(&e)),
        };

        record_result_on_span(&result);

        result
    }
}

async fn read_reply(response: reqwest::Response) -> Result<Value, TransportError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| from_reqwest(&e))?;
    let body = serde_json::from_slice::<Value>(&bytes);

    if status.is_success() {
        return body.map_err(|e| {
            TransportError::new(
                TransportErrorCode::BadResponse,
                format!("Reply is not valid JSON: {e}"),
            )
            .with_status(status.as_u16())
        });
    }

    Err(TransportError::new(
        status_code(status),
        format!("Request failed with status code {}", status.as_u16()),
    )
    .with_status(status.as_u16())
    .with_body(body.ok()))
}

fn status_code(status: StatusCode) -> TransportErrorCode {
    if status.is_client_error() {
        TransportErrorCode::BadRequest
    } else {
        TransportErrorCode::BadResponse
    }
}

fn from_reqwest(error: &reqwest::Error) -> TransportError {
    let code = if error.is_timeout() {
        TransportErrorCode::Timeout
    } else if error.is_redirect() {
        TransportErrorCode::TooManyRedirects
    } else if error.is_builder() {
        TransportErrorCode::BadOption
    } else if error.is_decode() || error.is_body() {
        TransportErrorCode::BadResponse
    } else {
        match io_error_kind(error) {
            Some(io::ErrorKind::ConnectionRefused) => TransportErrorCode::ConnectionRefused,
            Some(io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted) => {
                TransportErrorCode::Aborted
            }
            _ => TransportErrorCode::Network,
        }
    };
    let mut transport_error = TransportError::new(code, error_chain(error));
    if let Some(status) = error.status() {
        transport_error = transport_error.with_status(status.as_u16());
    }
    transport_error
}

/// Finds the first I/O error in the source chain of `error`.
fn io_error_kind(error: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io_error) = err.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
        source = err.source();
    }
    None
}

/// Renders `error` followed by each of its sources.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    message
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to signer failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}
