//! HTTP client for the relay-status API.
//!
//! Endpoints:
//! - POST {endpoint}/transactions
//! - GET {endpoint}/packets/{tx_hash}?chain_id=<id>

use crate::{RelayApi, RelayApiError};
use async_trait::async_trait;
use intent_config::RelayConfig;
use intent_types::{truncate_id, ChainId, RelayPacket};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct SubmitTransactionBody<'a> {
	chain_id: String,
	tx_hash: &'a str,
}

/// Relay API client over HTTP with JSON bodies.
pub struct HttpRelayApi {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpRelayApi {
	pub fn new(endpoint: &str) -> Result<Self, RelayApiError> {
		let client = reqwest::Client::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()
			.map_err(|e| RelayApiError::Fatal(format!("Failed to build HTTP client: {}", e)))?;
		Ok(Self {
			client,
			endpoint: endpoint.trim_end_matches('/').to_string(),
		})
	}

	pub fn from_config(config: &RelayConfig) -> Result<Self, RelayApiError> {
		Self::new(&config.endpoint)
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

fn is_retryable_status(status: StatusCode) -> bool {
	status.is_server_error()
		|| status == StatusCode::REQUEST_TIMEOUT
		|| status == StatusCode::TOO_MANY_REQUESTS
}

async fn status_error(response: Response) -> RelayApiError {
	let status = response.status();
	let body = response.text().await.unwrap_or_default();
	let message = format!("relay returned status {}: {}", status, body);
	if is_retryable_status(status) {
		RelayApiError::Retryable(message)
	} else {
		RelayApiError::Fatal(message)
	}
}

fn request_error(error: reqwest::Error) -> RelayApiError {
	RelayApiError::Retryable(format!("relay request failed: {}", error))
}

#[async_trait]
impl RelayApi for HttpRelayApi {
	async fn submit_transaction(
		&self,
		chain_id: ChainId,
		tx_hash: &str,
	) -> Result<(), RelayApiError> {
		let url = format!("{}/transactions", self.endpoint);
		let body = SubmitTransactionBody {
			chain_id: chain_id.to_string(),
			tx_hash,
		};

		let response = self
			.client
			.post(&url)
			.json(&body)
			.send()
			.await
			.map_err(request_error)?;

		if !response.status().is_success() {
			return Err(status_error(response).await);
		}

		tracing::debug!(
			chain_id = %chain_id,
			tx_hash = %truncate_id(tx_hash),
			"Submitted transaction to relay"
		);
		Ok(())
	}

	async fn get_packet(
		&self,
		chain_id: ChainId,
		tx_hash: &str,
	) -> Result<Option<RelayPacket>, RelayApiError> {
		let url = format!("{}/packets/{}", self.endpoint, tx_hash);

		let response = self
			.client
			.get(&url)
			.query(&[("chain_id", chain_id.to_string())])
			.send()
			.await
			.map_err(request_error)?;

		if response.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		if !response.status().is_success() {
			return Err(status_error(response).await);
		}

		let packet = response.json::<RelayPacket>().await.map_err(|e| {
			RelayApiError::Retryable(format!("failed to parse relay packet: {}", e))
		})?;
		Ok(Some(packet))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use intent_types::RelayStatus;
	use serde_json::json;
	use wiremock::matchers::{body_json, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const HASH: &str = "0x5f3c2b7a";

	fn api(server: &MockServer) -> HttpRelayApi {
		HttpRelayApi::new(&format!("{}/", server.uri())).unwrap()
	}

	#[tokio::test]
	async fn test_submit_posts_chain_and_hash() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/transactions"))
			.and(body_json(json!({"chain_id": "42161", "tx_hash": HASH})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
			.expect(1)
			.mount(&server)
			.await;

		api(&server)
			.submit_transaction(ChainId(42161), HASH)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_get_packet_decodes_wire_packet() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path(format!("/packets/{}", HASH)))
			.and(query_param("chain_id", "42161"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"src_chain_id": "42161",
				"src_tx_hash": HASH,
				"dst_chain_id": 146,
				"dst_tx_hash": "0xabc",
				"status": "executed",
				"conn_sn": 12
			})))
			.mount(&server)
			.await;

		let packet = api(&server)
			.get_packet(ChainId(42161), HASH)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(packet.status, RelayStatus::Delivered);
		assert_eq!(packet.dst_chain_id, ChainId(146));
		assert_eq!(packet.delivered_hash(), Some("0xabc"));
		assert_eq!(packet.conn_sn, Some(12));
	}

	#[tokio::test]
	async fn test_not_found_is_not_observed() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(404))
			.mount(&server)
			.await;

		let packet = api(&server).get_packet(ChainId(42161), HASH).await.unwrap();
		assert!(packet.is_none());
	}

	#[tokio::test]
	async fn test_error_classification() {
		let cases = [
			(500, true),
			(503, true),
			(429, true),
			(408, true),
			(400, false),
			(403, false),
		];
		for (status, retryable) in cases {
			let server = MockServer::start().await;
			Mock::given(method("GET"))
				.respond_with(ResponseTemplate::new(status))
				.mount(&server)
				.await;

			let err = api(&server)
				.get_packet(ChainId(42161), HASH)
				.await
				.unwrap_err();
			assert_eq!(err.is_retryable(), retryable, "status {}", status);
		}
	}

	#[tokio::test]
	async fn test_malformed_body_is_retryable() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
			.mount(&server)
			.await;

		let err = api(&server)
			.get_packet(ChainId(42161), HASH)
			.await
			.unwrap_err();
		assert!(err.is_retryable());
	}

	#[tokio::test]
	async fn test_submit_rejected_is_fatal() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(422).set_body_string("unknown chain"))
			.mount(&server)
			.await;

		let err = api(&server)
			.submit_transaction(ChainId(42161), HASH)
			.await
			.unwrap_err();
		assert!(matches!(err, RelayApiError::Fatal(message) if message.contains("unknown chain")));
	}

	#[tokio::test]
	async fn test_unreachable_relay_is_retryable() {
		let api = HttpRelayApi::new("http://127.0.0.1:1").unwrap();
		let err = api.get_packet(ChainId(42161), HASH).await.unwrap_err();
		assert!(err.is_retryable());
	}
}
