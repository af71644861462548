//! Relay wait state machine.
//!
//! ```text
//! SUBMITTED -> AWAITING_PACKET -> DELIVERED | TIMED_OUT | RELAY_FAILED | CANCELLED
//! ```
//!
//! Same-chain operations skip straight to DELIVERED with the source hash as
//! destination hash. The deadline and the cancel signal are checked at the
//! top of each poll iteration; a request in flight is never interrupted.
//! Polling is read-only, so repeated or concurrent waits on the same hash are
//! safe.

use crate::{CancelSignal, RelayApi, RelayApiError};
use intent_config::RelayConfig;
use intent_types::{
	truncate_id, ChainId, ChainRegistry, IntentError, IntentResult, RelayDelivery, RelayPacket,
	RelayState, RelayStatus, SpokeTransactionRecord, TransactionHash,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::instrument;

/// Callback invoked on every relay state transition.
pub type RelayObserver = Arc<dyn Fn(&TransactionHash, RelayState) + Send + Sync>;

/// Result of a single packet status read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
	/// Not observed yet, or still being processed by the relay.
	Pending,
	/// Executed on the hub; carries the hub transaction hash.
	Delivered(String),
	/// The relay reported a terminal failure.
	Failed(RelayPacket),
}

/// Per-call overrides of the configured wait defaults.
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
	pub timeout: Option<Duration>,
	pub poll_interval: Option<Duration>,
	pub cancel: Option<CancelSignal>,
}

impl WaitOptions {
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = Some(poll_interval);
		self
	}

	pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
		self.cancel = Some(cancel);
		self
	}
}

/// Drives a spoke transaction through the relay until a terminal state.
#[derive(Clone)]
pub struct RelayWaiter {
	api: Arc<dyn RelayApi>,
	registry: Arc<ChainRegistry>,
	timeout: Duration,
	poll_interval: Duration,
	observer: Option<RelayObserver>,
}

impl RelayWaiter {
	pub fn new(api: Arc<dyn RelayApi>, registry: Arc<ChainRegistry>, config: &RelayConfig) -> Self {
		Self {
			api,
			registry,
			timeout: config.timeout(),
			poll_interval: config.poll_interval(),
			observer: None,
		}
	}

	pub fn with_observer(mut self, observer: RelayObserver) -> Self {
		self.observer = Some(observer);
		self
	}

	/// Reads the packet status once.
	///
	/// Has no side effects and may be called any number of times, including
	/// after a wait timed out.
	pub async fn poll(
		&self,
		src_chain: ChainId,
		tx_hash: &TransactionHash,
	) -> Result<PollOutcome, RelayApiError> {
		let hash = self.format_hash(src_chain, tx_hash)?;

		let Some(packet) = self.api.get_packet(src_chain, &hash).await? else {
			return Ok(PollOutcome::Pending);
		};

		Ok(match packet.status {
			RelayStatus::Failed => PollOutcome::Failed(packet),
			RelayStatus::Delivered => match packet.delivered_hash() {
				Some(dst) => PollOutcome::Delivered(dst.to_string()),
				None => {
					tracing::debug!(
						tx_hash = %truncate_id(&hash),
						"Packet delivered without destination hash, still waiting"
					);
					PollOutcome::Pending
				},
			},
			RelayStatus::Pending => PollOutcome::Pending,
		})
	}

	/// Submits the spoke transaction to the relay, then waits for delivery.
	///
	/// When the spoke chain is the hub chain nothing is relayed and the result
	/// is delivered immediately with the source hash as destination hash.
	#[instrument(skip_all, fields(chain_id = %record.source_chain))]
	pub async fn submit_and_wait(
		&self,
		record: &SpokeTransactionRecord,
		options: WaitOptions,
	) -> IntentResult<RelayDelivery> {
		let src_tx_hash = &record.tx_hash;

		if self.registry.is_hub(record.source_chain) {
			return self.same_chain_delivery(record);
		}

		self.transition(src_tx_hash, RelayState::Submitted);

		let hash = self
			.format_hash(record.source_chain, src_tx_hash)
			.map_err(|e| relay_failed(src_tx_hash, e.to_string()))?;
		self.api
			.submit_transaction(record.source_chain, &hash)
			.await
			.map_err(|e| {
				tracing::error!(
					tx_hash = %truncate_id(&hash),
					error = %e,
					"Relay submission failed"
				);
				IntentError::RelaySubmissionFailed {
					src_tx_hash: src_tx_hash.clone(),
					message: e.to_string(),
				}
			})?;

		self.wait_for_packet(record, options).await
	}

	/// Polls until the packet is delivered, fails, the deadline passes, or the
	/// wait is cancelled.
	///
	/// Retryable API errors are logged and polling continues. A timeout is
	/// reported as `RelayTimeout`; the hash remains valid for later polls.
	/// Hub chain records are delivered immediately without polling.
	pub async fn wait_for_packet(
		&self,
		record: &SpokeTransactionRecord,
		options: WaitOptions,
	) -> IntentResult<RelayDelivery> {
		if self.registry.is_hub(record.source_chain) {
			return self.same_chain_delivery(record);
		}

		let src_chain = record.source_chain;
		let src_tx_hash = &record.tx_hash;
		let timeout = options.timeout.unwrap_or(self.timeout);
		let poll_interval = options.poll_interval.unwrap_or(self.poll_interval);
		let mut cancel = options.cancel;

		let start = Instant::now();
		let deadline = start + timeout;
		let hash_str = truncate_id(&src_tx_hash.to_hex());

		self.transition(src_tx_hash, RelayState::AwaitingPacket);

		loop {
			if cancel.as_ref().is_some_and(CancelSignal::is_cancelled) {
				self.transition(src_tx_hash, RelayState::Cancelled);
				return Err(IntentError::Cancelled {
					src_tx_hash: src_tx_hash.clone(),
				});
			}

			let now = Instant::now();
			if now >= deadline {
				let waited = now - start;
				tracing::warn!(
					tx_hash = %hash_str,
					waited_secs = waited.as_secs(),
					"Relay wait timed out"
				);
				self.transition(src_tx_hash, RelayState::TimedOut);
				return Err(IntentError::RelayTimeout {
					src_tx_hash: src_tx_hash.clone(),
					waited,
				});
			}

			match self.poll(src_chain, src_tx_hash).await {
				Ok(PollOutcome::Delivered(dst_tx_hash)) => {
					tracing::info!(
						tx_hash = %hash_str,
						dst_tx_hash = %truncate_id(&dst_tx_hash),
						"Packet delivered"
					);
					self.transition(src_tx_hash, RelayState::Delivered);
					return Ok(RelayDelivery {
						src_chain_id: src_chain,
						src_tx_hash: src_tx_hash.clone(),
						dst_tx_hash,
					});
				},
				Ok(PollOutcome::Failed(packet)) => {
					let message = format!(
						"Relay reported packet failure (dst_chain_id: {}, conn_sn: {:?})",
						packet.dst_chain_id, packet.conn_sn
					);
					tracing::error!(tx_hash = %hash_str, "{}", message);
					self.transition(src_tx_hash, RelayState::RelayFailed);
					return Err(relay_failed(src_tx_hash, message));
				},
				Ok(PollOutcome::Pending) => {
					tracing::debug!(tx_hash = %hash_str, "Packet pending");
				},
				Err(RelayApiError::Retryable(e)) => {
					tracing::warn!(tx_hash = %hash_str, error = %e, "Relay poll failed, retrying");
				},
				Err(e @ RelayApiError::Fatal(_)) => {
					tracing::error!(tx_hash = %hash_str, error = %e, "Relay poll rejected");
					self.transition(src_tx_hash, RelayState::RelayFailed);
					return Err(relay_failed(src_tx_hash, e.to_string()));
				},
			}

			let remaining = deadline.saturating_duration_since(Instant::now());
			let sleep = tokio::time::sleep(poll_interval.min(remaining));
			match cancel.as_mut() {
				Some(signal) => {
					tokio::select! {
						_ = sleep => {},
						_ = signal.cancelled() => {},
					}
				},
				None => sleep.await,
			}
		}
	}

	/// The hub transaction is its own delivery: destination hash equals the
	/// source hash in the hub's format.
	fn same_chain_delivery(&self, record: &SpokeTransactionRecord) -> IntentResult<RelayDelivery> {
		let src_tx_hash = &record.tx_hash;
		let dst_tx_hash = self
			.format_hash(record.source_chain, src_tx_hash)
			.map_err(|e| relay_failed(src_tx_hash, e.to_string()))?;
		self.transition(src_tx_hash, RelayState::Delivered);
		Ok(RelayDelivery {
			src_chain_id: record.source_chain,
			src_tx_hash: src_tx_hash.clone(),
			dst_tx_hash,
		})
	}

	fn format_hash(
		&self,
		chain_id: ChainId,
		tx_hash: &TransactionHash,
	) -> Result<String, RelayApiError> {
		let chain = self.registry.get(chain_id).ok_or_else(|| {
			RelayApiError::Fatal(format!("Chain {} is not configured", chain_id))
		})?;
		Ok(chain.family.format_tx_hash(tx_hash))
	}

	fn transition(&self, tx_hash: &TransactionHash, state: RelayState) {
		tracing::debug!(tx_hash = %truncate_id(&tx_hash.to_hex()), state = %state, "Relay state");
		if let Some(observer) = &self.observer {
			observer(tx_hash, state);
		}
	}
}

fn relay_failed(src_tx_hash: &TransactionHash, message: String) -> IntentError {
	IntentError::RelayFailed {
		src_tx_hash: src_tx_hash.clone(),
		message,
	}
}
