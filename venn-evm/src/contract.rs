//! Solidity interface definitions for the Venn firewall.
//!
//! Contains the minimal ABI surface needed to deliver an approval on-chain:
//! - [`ISecurityValidator`] - validator that records approved call hashes
//! - [`IFirewallConsumer`] - consumer entry point that forwards the approval
//!   before running the original call

use alloy_sol_types::sol;

sol! {
    /// Security validator that accepts signer-approved call hashes.
    ///
    /// Argument order is fixed by the deployed contract.
    #[allow(missing_docs)]
    #[derive(Debug)]
    interface ISecurityValidator {
        function approveCallsViaSignature(
            bytes32[] callHashes,
            uint256 expiration,
            address txOrigin,
            uint256 nonce,
            bytes signature
        ) external;
    }
}

sol! {
    /// Firewall consumer entry point.
    ///
    /// Calls `target` with `targetPayload` first, then executes `data` on the
    /// consumer itself.
    #[allow(missing_docs)]
    #[derive(Debug)]
    interface IFirewallConsumer {
        function safeFunctionCall(
            address target,
            bytes targetPayload,
            bytes data
        ) external payable;
    }
}
