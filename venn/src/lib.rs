#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types and approval client for the Venn transaction approval service.
//!
//! Before a transaction is broadcast, Venn's signer evaluates it against an
//! on-chain policy. This crate sends the transaction to the signer, interprets
//! the verdict and, for the firewall protocol, wraps the signer's approval into
//! a new transaction payload that the firewall consumer contract can verify.
//!
//! # Overview
//!
//! A [`VennClient`](client::VennClient) is built once from a
//! [`ClientConfig`](config::ClientConfig), a [`SignerTransport`](transport::SignerTransport)
//! and a [`Protocol`](protocol::Protocol) strategy. Each call to
//! [`approve`](client::VennClient::approve) issues exactly one request and either
//! returns the approved transaction or a classified [`VennError`](error::VennError).
//! In non-strict mode per-call failures are swallowed and the unmodified input
//! transaction is returned instead.
//!
//! # Modules
//!
//! - [`classify`] - Maps transport failures and signer replies onto the error taxonomy
//! - [`client`] - The approval client
//! - [`config`] - Client configuration and its validation
//! - [`encoder`] - Two-stage firewall transaction encoding over a pluggable ABI encoder
//! - [`error`] - The error taxonomy
//! - [`protocol`] - Legacy and firewall protocol strategies
//! - [`transport`] - Transport seam and transport error codes
//! - [`types`] - Wire format types exchanged with the signer
//! - [`validation`] - URL and address predicates
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation of client calls

pub mod classify;
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::VennClient;
pub use config::ClientConfig;
pub use error::VennError;
pub use protocol::{FirewallProtocol, LegacyProtocol, Protocol};
pub use transport::{SignerTransport, TransportError, TransportErrorCode};
pub use types::TransactionRequest;
