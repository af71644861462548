//! Intent execution pipeline.
//!
//! `execute` runs validate -> resolve hub wallet -> encode -> submit -> relay
//! as one sequential operation. Nothing in the pipeline retries on its own;
//! every error after the spoke broadcast carries the spoke transaction hash
//! so callers can resume with [`IntentService::relay_and_wait`] or
//! [`IntentService::wait_relay`] instead of submitting again.

use crate::{EventBus, ExecutionNotifier};
use intent_delivery::{submit, validate_transfer, SpokeProvider, SubmitOptions, SubmitRequest};
use intent_relay::{PollOutcome, RelayObserver, RelayWaiter, WaitOptions};
use intent_types::{
	truncate_id, Address, CallBatch, ChainId, ChainRegistry, HubAddress, IntentError, IntentEvent,
	IntentResult, RelayDelivery, SpokeTransaction, SpokeTransactionRecord, SubmitMode,
	TokenTransfer, TransactionHash, TxOutcome,
};
use intent_wallet::WalletResolver;
use std::sync::Arc;
use tracing::instrument;

/// One logical user operation.
#[derive(Debug, Clone, Default)]
pub struct IntentRequest {
	/// Value deposited into the user's hub wallet before the calls run.
	pub transfer: Option<TokenTransfer>,
	/// Calls the hub wallet executes, in order. May be empty for a plain deposit.
	pub calls: CallBatch,
	/// Skips simulation even when the service is configured to simulate.
	pub skip_simulation: bool,
	/// Overrides of the relay wait defaults.
	pub wait: WaitOptions,
}

impl IntentRequest {
	pub fn new(calls: CallBatch) -> Self {
		Self {
			calls,
			..Default::default()
		}
	}

	pub fn with_transfer(mut self, transfer: TokenTransfer) -> Self {
		self.transfer = Some(transfer);
		self
	}

	pub fn with_wait(mut self, wait: WaitOptions) -> Self {
		self.wait = wait;
		self
	}

	pub fn skip_simulation(mut self) -> Self {
		self.skip_simulation = true;
		self
	}
}

/// A confirmed spoke transaction and the hub transaction that executed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedIntent {
	pub spoke_tx: SpokeTransactionRecord,
	pub hub_tx_hash: String,
}

/// Runs intents from any configured chain against the hub.
#[derive(Clone)]
pub struct IntentService {
	registry: Arc<ChainRegistry>,
	resolver: WalletResolver,
	relay: RelayWaiter,
	event_bus: EventBus,
	notifier: Option<Arc<dyn ExecutionNotifier>>,
	simulate: bool,
}

impl IntentService {
	pub fn new(
		registry: Arc<ChainRegistry>,
		resolver: WalletResolver,
		relay: RelayWaiter,
		event_bus: EventBus,
	) -> Self {
		let bus = event_bus.clone();
		let observer: RelayObserver = Arc::new(move |tx_hash, state| {
			bus.publish(IntentEvent::RelayStateChanged {
				tx_hash: tx_hash.clone(),
				state,
			})
			.ok();
		});

		Self {
			registry,
			resolver,
			relay: relay.with_observer(observer),
			event_bus,
			notifier: None,
			simulate: true,
		}
	}

	pub fn with_notifier(mut self, notifier: Arc<dyn ExecutionNotifier>) -> Self {
		self.notifier = Some(notifier);
		self
	}

	/// Enables or disables simulation before broadcast. Enabled by default.
	pub fn with_simulation(mut self, simulate: bool) -> Self {
		self.simulate = simulate;
		self
	}

	pub fn registry(&self) -> &Arc<ChainRegistry> {
		&self.registry
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	pub fn resolver(&self) -> &WalletResolver {
		&self.resolver
	}

	/// Resolves the hub wallet of `user` on `chain_id`.
	pub async fn resolve_wallet(
		&self,
		chain_id: ChainId,
		user: &Address,
	) -> IntentResult<HubAddress> {
		self.resolver.resolve(chain_id, user).await
	}

	/// Executes an intent end to end.
	///
	/// Returns once the hub transaction is confirmed by the relay. Spoke and
	/// hub are the same chain when `provider` is the hub provider; the relay is
	/// skipped and the hub hash equals the spoke hash.
	#[instrument(skip_all, fields(chain_id = %provider.chain_id()))]
	pub async fn execute(
		&self,
		provider: &SpokeProvider,
		request: IntentRequest,
	) -> IntentResult<ExecutedIntent> {
		let result = self.run_execute(provider, request).await;
		if let Err(e) = &result {
			self.report_failure(e);
		}
		result
	}

	/// Builds the unsigned spoke transaction for an intent.
	///
	/// Runs the same validation and hub wallet resolution as [`Self::execute`]
	/// but never signs, simulates or broadcasts.
	#[instrument(skip_all, fields(chain_id = %provider.chain_id()))]
	pub async fn prepare_raw(
		&self,
		provider: &SpokeProvider,
		request: IntentRequest,
	) -> IntentResult<SpokeTransaction> {
		let submit_request = self.prepare(provider, &request).await?;
		let options = SubmitOptions {
			mode: SubmitMode::Raw,
			skip_simulation: true,
		};

		match submit(provider, submit_request, options).await? {
			TxOutcome::Unsigned(tx) => Ok(tx),
			TxOutcome::Submitted(record) => Err(IntentError::SubmissionFailed(format!(
				"Raw submission broadcast transaction {}",
				record.tx_hash.to_hex()
			))),
		}
	}

	/// Reads the relay status of a spoke transaction once.
	pub async fn poll_relay(
		&self,
		src_chain: ChainId,
		tx_hash: &TransactionHash,
	) -> IntentResult<PollOutcome> {
		self.relay
			.poll(src_chain, tx_hash)
			.await
			.map_err(|e| IntentError::RelayFailed {
				src_tx_hash: tx_hash.clone(),
				message: e.to_string(),
			})
	}

	/// Waits for an already relayed spoke transaction, without resubmitting it.
	pub async fn wait_relay(
		&self,
		record: &SpokeTransactionRecord,
		options: WaitOptions,
	) -> IntentResult<RelayDelivery> {
		let result = self.relay.wait_for_packet(record, options).await;
		self.report_relay_result(&result);
		result
	}

	/// Submits a confirmed spoke transaction to the relay and waits for it.
	///
	/// Used to resume after `RelaySubmissionFailed`.
	pub async fn relay_and_wait(
		&self,
		record: &SpokeTransactionRecord,
		options: WaitOptions,
	) -> IntentResult<RelayDelivery> {
		let result = self.relay.submit_and_wait(record, options).await;
		self.report_relay_result(&result);
		result
	}

	async fn run_execute(
		&self,
		provider: &SpokeProvider,
		request: IntentRequest,
	) -> IntentResult<ExecutedIntent> {
		let submit_request = self.prepare(provider, &request).await?;
		let options = SubmitOptions {
			mode: SubmitMode::Execute,
			skip_simulation: request.skip_simulation || !self.simulate,
		};

		let record = match submit(provider, submit_request, options).await? {
			TxOutcome::Submitted(record) => record,
			TxOutcome::Unsigned(_) => {
				return Err(IntentError::SubmissionFailed(
					"Spoke submission returned an unsigned transaction".into(),
				));
			},
		};

		self.event_bus
			.publish(IntentEvent::TransactionSubmitted {
				chain_id: record.source_chain,
				tx_hash: record.tx_hash.clone(),
			})
			.ok();

		let delivery = self.relay.submit_and_wait(&record, request.wait).await?;
		self.publish_delivered(&delivery);
		self.spawn_notification(delivery.dst_tx_hash.clone());

		Ok(ExecutedIntent {
			spoke_tx: record,
			hub_tx_hash: delivery.dst_tx_hash,
		})
	}

	/// Validates the request, encodes the batch and resolves the hub wallet.
	async fn prepare(
		&self,
		provider: &SpokeProvider,
		request: &IntentRequest,
	) -> IntentResult<SubmitRequest> {
		let payload = if request.calls.is_empty() {
			Default::default()
		} else {
			intent_codec::encode(&request.calls)
				.map_err(|e| IntentError::ValidationFailed(e.to_string()))?
		};
		validate_transfer(provider, request.transfer.as_ref(), &payload)?;

		let hub_wallet = self
			.resolver
			.resolve(provider.chain_id(), provider.user())
			.await?;
		self.event_bus
			.publish(IntentEvent::WalletResolved {
				chain_id: provider.chain_id(),
				hub_wallet,
			})
			.ok();

		Ok(SubmitRequest {
			hub_wallet,
			transfer: request.transfer.clone(),
			payload,
		})
	}

	fn report_relay_result(&self, result: &IntentResult<RelayDelivery>) {
		match result {
			Ok(delivery) => self.publish_delivered(delivery),
			Err(e) => self.report_failure(e),
		}
	}

	fn publish_delivered(&self, delivery: &RelayDelivery) {
		self.event_bus
			.publish(IntentEvent::Delivered {
				src_tx_hash: delivery.src_tx_hash.clone(),
				dst_tx_hash: delivery.dst_tx_hash.clone(),
			})
			.ok();
	}

	fn report_failure(&self, error: &IntentError) {
		let src_tx_hash = error.spoke_tx_hash().cloned();
		match &src_tx_hash {
			Some(hash) => tracing::error!(
				code = ?error.code(),
				tx_hash = %truncate_id(&hash.to_hex()),
				error = %error,
				"Intent failed after spoke broadcast"
			),
			None => tracing::warn!(code = ?error.code(), error = %error, "Intent failed"),
		}
		self.event_bus
			.publish(IntentEvent::Failed {
				code: error.code(),
				message: error.to_string(),
				src_tx_hash,
			})
			.ok();
	}

	/// Notifies the solver on a detached task. Failures become events.
	fn spawn_notification(&self, intent_tx_hash: String) {
		let Some(notifier) = self.notifier.clone() else {
			return;
		};
		let event_bus = self.event_bus.clone();

		tokio::spawn(async move {
			if let Err(e) = notifier.notify_executed(&intent_tx_hash).await {
				tracing::warn!(
					tx_hash = %truncate_id(&intent_tx_hash),
					error = %e,
					"Solver execution notification failed"
				);
				event_bus
					.publish(IntentEvent::DetachedTaskFailed {
						task: "solver_execution".into(),
						error: e.to_string(),
					})
					.ok();
			}
		});
	}
}
