//! The Venn approval client.
//!
//! [`VennClient`] validates its configuration once at construction and holds it
//! immutably afterwards. Each [`approve`](VennClient::approve) call issues one
//! POST to the signer, classifies any failure and hands approved replies to the
//! [`Protocol`] strategy. Nothing is retried and no state survives between
//! calls, so one client can serve concurrent calls.

use alloy_primitives::Address;
use serde_json::Value;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::classify::{SignerFailure, classify, classify_verdict};
use crate::config::ClientConfig;
use crate::error::VennError;
use crate::protocol::{Protocol, SIGNER_PATH, endpoint};
use crate::transport::SignerTransport;
use crate::types::{
    InspectTxPayload, InspectTxResponse, SignedTxResponse, SignerResponse, TransactionRequest,
    TxStatus,
};

/// Client for the Venn signer.
///
/// Generic over the [`SignerTransport`] that carries requests and the
/// [`Protocol`] generation spoken by the signer; tests substitute fakes for
/// either at construction.
#[derive(Debug, Clone)]
pub struct VennClient<T, P> {
    config: ClientConfig,
    base_url: Url,
    sign_url: Url,
    signer_url: Url,
    policy_address: Address,
    transport: T,
    protocol: P,
}

impl<T, P> VennClient<T, P>
where
    T: SignerTransport,
    P: Protocol,
{
    /// Creates a client after validating `config` for `protocol`.
    ///
    /// # Errors
    ///
    /// Returns [`VennError::InvalidInitParams`] if the URL does not parse, the
    /// policy address is missing or malformed, or the protocol requires a
    /// chain identifier the configuration lacks. Construction errors are
    /// returned regardless of `strict`.
    pub fn new(config: ClientConfig, transport: T, protocol: P) -> Result<Self, VennError> {
        let validated = config.validate(protocol.requires_chain_id())?;
        let sign_url = protocol.sign_url(&validated.base_url).ok_or_else(|| {
            VennError::invalid_init(format!("url {} cannot carry a path", validated.base_url))
        })?;
        let signer_url = endpoint(&validated.base_url, &SIGNER_PATH).ok_or_else(|| {
            VennError::invalid_init(format!("url {} cannot carry a path", validated.base_url))
        })?;

        Ok(Self {
            config,
            base_url: validated.base_url,
            sign_url,
            signer_url,
            policy_address: validated.policy_address,
            transport,
            protocol,
        })
    }

    /// Returns the configuration exactly as given.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the parsed signer URL.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the URL approval requests are posted to.
    pub const fn sign_url(&self) -> &Url {
        &self.sign_url
    }

    /// Returns the URL inspection requests are posted to.
    ///
    /// This is `signer` appended to the configured URL. The operator endpoint
    /// belongs to the firewall service, so it is only meaningful when the
    /// configured URL is a service base URL. For [`LegacyProtocol`] the
    /// configured URL is the sign endpoint itself and the derived URL (for
    /// example `.../api/17000/sign/signer`) does not name a real endpoint.
    ///
    /// [`LegacyProtocol`]: crate::protocol::LegacyProtocol
    pub const fn signer_url(&self) -> &Url {
        &self.signer_url
    }

    /// Returns the parsed approving policy address.
    pub const fn policy_address(&self) -> Address {
        self.policy_address
    }

    /// Whether per-call failures are returned as errors.
    pub const fn is_strict(&self) -> bool {
        self.config.strict
    }

    /// Returns the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the protocol strategy.
    pub const fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Asks the signer to approve `tx`.
    ///
    /// On approval, returns the transaction to broadcast: the signer's
    /// transaction for the legacy protocol, or the firewall-wrapped
    /// transaction for the firewall protocol.
    ///
    /// In non-strict mode, transport failures and non-approved replies are
    /// logged and `tx` is returned unchanged. Encoding failures and malformed
    /// approved payloads are always returned as errors.
    ///
    /// # Errors
    ///
    /// Returns the classified [`VennError`] for the failure.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "venn.client.approve",
            skip_all,
            fields(protocol = self.protocol.name(), strict = self.config.strict),
            err
        )
    )]
    pub async fn approve(&self, tx: TransactionRequest) -> Result<TransactionRequest, VennError> {
        match self.request_approval(&tx).await {
            Ok(approved) => Ok(approved),
            Err(error) if self.config.strict || error.is_payload_error() => Err(error),
            Err(error) => {
                log_fallback(&error);
                Ok(tx)
            }
        }
    }

    /// Asks the operator endpoint to evaluate `payload` without signing.
    ///
    /// Posts to [`signer_url`](Self::signer_url), so the client must be
    /// configured with the firewall service base URL.
    ///
    /// # Errors
    ///
    /// Returns the classified [`VennError`] for transport failures, or
    /// [`VennError::InvalidResponse`] for an unexpected reply. Never falls back,
    /// regardless of `strict`.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "venn.client.inspect_tx", skip_all, fields(request_id = %payload.request_id), err)
    )]
    pub async fn inspect_tx(
        &self,
        mut payload: InspectTxPayload,
    ) -> Result<InspectTxResponse, VennError> {
        payload.inspect_only = Some(true);
        let body = self.post(&self.signer_url, &payload).await?;
        decode(body, "inspection")
    }

    /// Asks the operator endpoint to evaluate and sign `payload`.
    ///
    /// # Errors
    ///
    /// Same as [`VennClient::inspect_tx`].
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "venn.client.signature", skip_all, fields(request_id = %payload.request_id), err)
    )]
    pub async fn signature(
        &self,
        mut payload: InspectTxPayload,
    ) -> Result<SignedTxResponse, VennError> {
        payload.inspect_only = None;
        let body = self.post(&self.signer_url, &payload).await?;
        decode(body, "signature")
    }

    async fn request_approval(
        &self,
        tx: &TransactionRequest,
    ) -> Result<TransactionRequest, VennError> {
        let request = self
            .protocol
            .build_request(tx, self.policy_address, self.config.chain_id);
        let body = self.post(&self.sign_url, &request).await?;
        let data = approved_data(body)?;
        self.protocol.finalize(tx, data)
    }

    async fn post<B>(&self, url: &Url, body: &B) -> Result<Value, VennError>
    where
        B: serde::Serialize + Sync,
    {
        self.transport
            .post_json(url, body)
            .await
            .map_err(|e| classify(SignerFailure::Transport(e)))
    }
}

/// Extracts `data` from an approved reply.
///
/// Anything other than a reply with `status == "Approved"` is a failure,
/// whatever HTTP status carried it. Typed verdicts are classified from their
/// status; bodies that are not a signer reply at all go through the
/// structural classifier.
fn approved_data(body: Value) -> Result<Value, VennError> {
    match serde_json::from_value::<SignerResponse>(body.clone()) {
        Ok(SignerResponse {
            status: TxStatus::Approved,
            data,
            ..
        }) => Ok(data.unwrap_or(Value::Null)),
        Ok(SignerResponse {
            status, message, ..
        }) => Err(classify_verdict(status, message)),
        Err(_) => Err(classify(SignerFailure::Reply(body))),
    }
}

fn decode<R>(body: Value, context: &'static str) -> Result<R, VennError>
where
    R: serde::de::DeserializeOwned,
{
    serde_json::from_value(body).map_err(|e| VennError::InvalidResponse {
        context,
        message: e.to_string(),
    })
}

#[cfg(feature = "telemetry")]
fn log_fallback(error: &VennError) {
    tracing::warn!(error = %error, "Approval failed, returning the unapproved transaction");
}

#[cfg(not(feature = "telemetry"))]
const fn log_fallback(_error: &VennError) {}
