//! Client configuration.
//!
//! [`ClientConfig`] lists every option the approval client understands. It can
//! be built in code, deserialized from JSON (or any serde format), or read from
//! the environment with [`ClientConfig::from_env`].
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "url": "https://signer.venn.build",
//!   "policyAddress": "0xf4E5AB115d0775caf24eF25979991516f2283C20",
//!   "chainId": 17000,
//!   "strict": true
//! }
//! ```
//!
//! The historical key names `vennURL` and `vennPolicyAddress` are accepted too.
//!
//! # Environment Variables
//!
//! - `VENN_URL` - Signer base URL (required)
//! - `VENN_POLICY_ADDRESS` - Approving policy contract address
//! - `VENN_CHAIN_ID` - Chain identifier
//! - `VENN_STRICT` - `true`/`false` (default: `true`)

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::VennError;
use crate::validation::parse_address;

/// Approval client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Signer URL. For the legacy protocol this is the sign endpoint itself,
    /// for the firewall protocol it is the service base URL.
    #[serde(alias = "vennURL", alias = "vennUrl")]
    pub url: String,

    /// Address of the policy contract the signer evaluates against.
    #[serde(default, alias = "vennPolicyAddress")]
    pub policy_address: Option<String>,

    /// Chain identifier, required by the legacy protocol.
    #[serde(default)]
    pub chain_id: Option<u64>,

    /// Whether per-call failures are returned as errors (default: `true`).
    ///
    /// When `false`, failures are swallowed and the unapproved input
    /// transaction is returned. Callers relying on this must verify on their
    /// own that approval was not bypassed.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

const fn default_strict() -> bool {
    true
}

/// Values derived from a [`ClientConfig`] during validation.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedConfig {
    pub(crate) base_url: Url,
    pub(crate) policy_address: Address,
}

impl ClientConfig {
    /// Creates a strict configuration for `url` with no policy or chain set.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            policy_address: None,
            chain_id: None,
            strict: true,
        }
    }

    /// Sets the approving policy address.
    #[must_use]
    pub fn with_policy_address(mut self, policy_address: impl Into<String>) -> Self {
        self.policy_address = Some(policy_address.into());
        self
    }

    /// Sets the chain identifier.
    #[must_use]
    pub const fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Sets strict mode.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`VennError::InvalidInitParams`] if `VENN_URL` is unset or a
    /// variable holds a value of the wrong type.
    pub fn from_env() -> Result<Self, VennError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VennError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("VENN_URL").ok_or_else(|| VennError::invalid_init("VENN_URL is not set"))?;
        let mut config = Self::new(url);
        config.policy_address = lookup("VENN_POLICY_ADDRESS");
        if let Some(chain_id) = lookup("VENN_CHAIN_ID") {
            let chain_id = chain_id.trim().parse().map_err(|_| {
                VennError::invalid_init(format!("VENN_CHAIN_ID is not an integer: {chain_id}"))
            })?;
            config.chain_id = Some(chain_id);
        }
        if let Some(strict) = lookup("VENN_STRICT") {
            config.strict = parse_flag(&strict).ok_or_else(|| {
                VennError::invalid_init(format!("VENN_STRICT is not a boolean: {strict}"))
            })?;
        }
        Ok(config)
    }

    /// Checks required values and parses the URL and policy address.
    pub(crate) fn validate(&self, requires_chain_id: bool) -> Result<ValidatedConfig, VennError> {
        let base_url = Url::parse(&self.url)
            .map_err(|e| VennError::invalid_init(format!("invalid url {:?}: {e}", self.url)))?;

        let policy_address = self
            .policy_address
            .as_deref()
            .ok_or_else(|| VennError::invalid_init("policy address is required"))?;
        let policy_address = parse_address(policy_address).ok_or_else(|| {
            VennError::invalid_init(format!("invalid policy address {policy_address:?}"))
        })?;

        match self.chain_id {
            Some(0) => return Err(VennError::invalid_init("chain id must be positive")),
            None if requires_chain_id => {
                return Err(VennError::invalid_init("chain id is required"));
            }
            _ => {}
        }

        Ok(ValidatedConfig {
            base_url,
            policy_address,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
