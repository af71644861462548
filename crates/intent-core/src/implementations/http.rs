//! Solver execution endpoint over HTTP.
//!
//! POST {endpoint}/execute with `{"intent_tx_hash": "<hub tx hash>"}`.

use crate::{ExecutionNotifier, NotifierError};
use async_trait::async_trait;
use intent_config::SolverConfig;
use intent_types::truncate_id;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ExecuteBody<'a> {
	intent_tx_hash: &'a str,
}

pub struct HttpExecutionNotifier {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpExecutionNotifier {
	pub fn new(endpoint: &str) -> Result<Self, NotifierError> {
		let client = reqwest::Client::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()
			.map_err(|e| NotifierError::Network(format!("Failed to build HTTP client: {}", e)))?;
		Ok(Self {
			client,
			endpoint: endpoint.trim_end_matches('/').to_string(),
		})
	}

	pub fn from_config(config: &SolverConfig) -> Result<Self, NotifierError> {
		Self::new(&config.endpoint)
	}
}

#[async_trait]
impl ExecutionNotifier for HttpExecutionNotifier {
	async fn notify_executed(&self, intent_tx_hash: &str) -> Result<(), NotifierError> {
		let url = format!("{}/execute", self.endpoint);

		let response = self
			.client
			.post(&url)
			.json(&ExecuteBody { intent_tx_hash })
			.send()
			.await
			.map_err(|e| NotifierError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(NotifierError::Rejected(format!("status {}: {}", status, body)));
		}

		tracing::debug!(tx_hash = %truncate_id(intent_tx_hash), "Notified solver of execution");
		Ok(())
	}
}
