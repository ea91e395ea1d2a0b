#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM bindings for the Venn firewall protocol.
//!
//! The firewall protocol delivers a signer's approval by wrapping the original
//! call in `safeFunctionCall` on the firewall consumer, which forwards an
//! `approveCallsViaSignature` call to the security validator first. This crate
//! provides the Solidity ABI encoding for both calls.
//!
//! # Modules
//!
//! - [`contract`] - `sol!` interface definitions
//! - [`encoder`] - [`CallEncoder`](venn::encoder::CallEncoder) implementation
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation in `venn`

pub mod contract;
pub mod encoder;

pub use encoder::{EncodeError, SolCallEncoder};

use venn::FirewallProtocol;

/// Returns the firewall protocol backed by [`SolCallEncoder`].
#[must_use]
pub const fn firewall_protocol() -> FirewallProtocol<SolCallEncoder> {
    FirewallProtocol::new(SolCallEncoder)
}
