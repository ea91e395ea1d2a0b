#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport for the Venn transaction approval client.
//!
//! Plugs a `reqwest`-backed [`HttpTransport`](transport::HttpTransport) into
//! [`venn::VennClient`], mapping HTTP failures onto the transport error codes
//! the client classifies.
//!
//! # Modules
//!
//! - [`client`] - Approval client over HTTP
//! - [`transport`] - `reqwest` implementation of [`venn::SignerTransport`]
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation of requests

pub mod client;
pub mod transport;

pub use client::{HttpVennClient, http_client};
pub use transport::HttpTransport;
