//! Approval client over HTTP.

use venn::{ClientConfig, Protocol, VennClient, VennError};

use crate::transport::HttpTransport;

/// A [`VennClient`] that reaches the signer through [`HttpTransport`].
pub type HttpVennClient<P> = VennClient<HttpTransport, P>;

/// Creates an approval client with a default [`HttpTransport`].
///
/// # Errors
///
/// Returns [`VennError::InvalidInitParams`] if `config` is invalid for
/// `protocol`.
pub fn http_client<P: Protocol>(
    config: ClientConfig,
    protocol: P,
) -> Result<HttpVennClient<P>, VennError> {
    VennClient::new(config, HttpTransport::new(), protocol)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy_primitives::{Bytes, address};
    use serde_json::json;
    use venn::LegacyProtocol;
    use venn::TransactionRequest;
    use venn::types::InspectTxPayload;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const POLICY: &str = "0xf4E5AB115d0775caf24eF25979991516f2283C20";

    fn tx() -> TransactionRequest {
        TransactionRequest::new(
            address!("0x6738fA889fF31F82d9Fe8862ec025dbE318f3Fde"),
            address!("0xF06Ab383528F51dA67E2b2407327731770156ED6"),
        )
        .with_data(Bytes::from_static(&[0x2e, 0xbd, 0x21, 0x16]))
    }

    fn legacy_config(server: &MockServer) -> ClientConfig {
        ClientConfig::new(format!("{}/api/17000/sign", server.uri()))
            .with_policy_address(POLICY)
            .with_chain_id(17000)
    }

    async fn mount_sign(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_legacy_approved() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/17000/sign"))
            .and(body_partial_json(json!({"chainId": 17000})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "unique-id",
                "status": "Approved",
                "data": tx(),
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = http_client(legacy_config(&mock_server), LegacyProtocol::new()).unwrap();
        assert_eq!(client.approve(tx()).await.unwrap(), tx());
    }

    #[tokio::test]
    async fn test_rejected_reply() {
        let mock_server = MockServer::start().await;
        mount_sign(
            &mock_server,
            "/api/17000/sign",
            ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "unique-id",
                "status": "Rejected",
                "message": "Transaction rejected by policy",
            })),
        )
        .await;

        let strict = http_client(legacy_config(&mock_server), LegacyProtocol::new()).unwrap();
        assert_eq!(
            strict.approve(tx()).await.unwrap_err(),
            VennError::TxRejected(Some("Transaction rejected by policy".into()))
        );

        let lenient = http_client(
            legacy_config(&mock_server).with_strict(false),
            LegacyProtocol::new(),
        )
        .unwrap();
        assert_eq!(lenient.approve(tx()).await.unwrap(), tx());
    }

    #[tokio::test]
    async fn test_server_error_body_is_classified() {
        let mock_server = MockServer::start().await;
        mount_sign(
            &mock_server,
            "/api/17000/sign",
            ResponseTemplate::new(500).set_body_json(json!({
                "requestId": "unique-id",
                "status": "Error",
                "message": "No Monitored Assets found",
            })),
        )
        .await;

        let client = http_client(legacy_config(&mock_server), LegacyProtocol::new()).unwrap();
        assert_eq!(
            client.approve(tx()).await.unwrap_err(),
            VennError::NoMonitoredAssets(Some("No Monitored Assets found".into()))
        );
    }

    #[tokio::test]
    async fn test_bad_request_status() {
        let mock_server = MockServer::start().await;
        mount_sign(
            &mock_server,
            "/api/17000/sign",
            ResponseTemplate::new(400).set_body_json(json!({
                "status": "Error",
                "message": "No policy call in trace",
            })),
        )
        .await;

        let client = http_client(legacy_config(&mock_server), LegacyProtocol::new()).unwrap();
        assert!(matches!(
            client.approve(tx()).await,
            Err(VennError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ClientConfig::new(format!("http://127.0.0.1:{port}"))
            .with_policy_address(POLICY)
            .with_chain_id(1);

        let strict = http_client(config.clone(), LegacyProtocol::new()).unwrap();
        assert!(matches!(
            strict.approve(tx()).await,
            Err(VennError::ConnectionRefused(_))
        ));

        let lenient = http_client(config.with_strict(false), LegacyProtocol::new()).unwrap();
        assert_eq!(lenient.approve(tx()).await.unwrap(), tx());
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;
        mount_sign(
            &mock_server,
            "/api/17000/sign",
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "Approved", "data": tx()}))
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let client = VennClient::new(
            legacy_config(&mock_server),
            HttpTransport::new().with_timeout(Duration::from_millis(50)),
            LegacyProtocol::new(),
        )
        .unwrap();
        assert!(matches!(
            client.approve(tx()).await,
            Err(VennError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_firewall_approved_is_wrapped() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/firewall/sign"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "unique-id",
                "status": "Approved",
                "data": {
                    "callHashes": [format!("0x{}", "11".repeat(32))],
                    "expiration": 1_723_125_409,
                    "txOrigin": "0x9a5cd1145791b29ac4e68df3bf8e30d2167daa76",
                    "nonce": 1,
                    "signature": "0x",
                },
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new(mock_server.uri()).with_policy_address(POLICY);
        let client = http_client(config, venn_evm::firewall_protocol()).unwrap();

        let first = client.approve(tx()).await.unwrap();
        assert_eq!(first.to, tx().to);
        assert_eq!(first.from, address!("0x9a5cd1145791b29ac4e68df3bf8e30d2167daa76"));
        assert_ne!(first.from, tx().from);
        assert_eq!(first.data[..4], [0x1a, 0x88, 0x28, 0xf4]);

        let second = client.approve(tx()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_inspect_tx_posts_to_signer() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/signer"))
            .and(body_partial_json(json!({"inspectOnly": true, "chainId": 17000})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "requestId": "unique-id",
                "approved": false,
                "metadata": [{"operator": "0x01", "approved": false}],
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new(mock_server.uri()).with_policy_address(POLICY);
        let client = http_client(config, venn_evm::firewall_protocol()).unwrap();

        let response = client
            .inspect_tx(InspectTxPayload {
                request_id: "unique-id".into(),
                chain_id: 17000,
                from: tx().from,
                to: tx().to,
                data: Some(tx().data),
                value: tx().value,
                inspect_only: None,
            })
            .await
            .unwrap();
        assert!(!response.approved);
        assert_eq!(response.metadata.len(), 1);
        assert_eq!(response.metadata[0].signature, None);
    }
}
