//! Subcommand handlers.
//!
//! Each handler returns the JSON document `main` prints on success.

use intent_core::{IntentRequest, IntentService};
use intent_delivery::implementations::evm::alloy::AlloySpokeClient;
use intent_delivery::SpokeProvider;
use intent_relay::{CancelHandle, PollOutcome, WaitOptions};
use intent_types::{
	current_timestamp, format_token_amount, parse_token_amount, without_0x_prefix, Address,
	CallBatch, ChainConfig, ChainFamily, ChainId, RelayDelivery, SpokeTransactionRecord,
	TokenTransfer,
};
use serde_json::{json, Value};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub type CommandResult = Result<Value, Box<dyn Error>>;

/// Decimals of the native currency on EVM chains.
const EVM_NATIVE_DECIMALS: u8 = 18;

pub struct WaitArgs {
	pub chain_id: u64,
	pub tx_hash: String,
	pub timeout: Option<u64>,
	pub poll_interval: Option<u64>,
	pub submit: bool,
}

pub struct PrepareArgs {
	pub chain_id: u64,
	pub user: String,
	pub token: Option<String>,
	pub amount: Option<String>,
	pub payload: Option<String>,
}

fn chain(service: &IntentService, chain_id: u64) -> Result<&ChainConfig, Box<dyn Error>> {
	service
		.registry()
		.get(ChainId(chain_id))
		.ok_or_else(|| format!("Chain {} is not configured", chain_id).into())
}

fn decode_hex(value: &str) -> Result<Vec<u8>, Box<dyn Error>> {
	Ok(hex::decode(without_0x_prefix(value.trim()))?)
}

pub async fn resolve(service: &IntentService, chain_id: u64, user: &str) -> CommandResult {
	let chain = chain(service, chain_id)?;
	let user = Address::parse(chain.family, user)?;
	let hub_wallet = service.resolve_wallet(chain.chain_id, &user).await?;

	Ok(json!({
		"chain_id": chain_id,
		"user": user.to_string(),
		"hub_wallet": hub_wallet.to_string(),
	}))
}

pub async fn status(service: &IntentService, chain_id: u64, tx_hash: &str) -> CommandResult {
	let chain = chain(service, chain_id)?;
	let tx_hash = chain.family.parse_tx_hash(tx_hash)?;
	let outcome = service.poll_relay(chain.chain_id, &tx_hash).await?;
	Ok(describe_outcome(&outcome))
}

/// Waits for a relayed transaction. Ctrl+C cancels the wait only.
pub async fn wait(service: &IntentService, args: WaitArgs) -> CommandResult {
	let chain = chain(service, args.chain_id)?;
	let record = SpokeTransactionRecord {
		source_chain: chain.chain_id,
		tx_hash: chain.family.parse_tx_hash(&args.tx_hash)?,
		submitted_at: current_timestamp(),
	};

	let cancel = CancelHandle::new();
	let mut options = WaitOptions::default().with_cancel(cancel.signal());
	if let Some(secs) = args.timeout {
		options = options.with_timeout(Duration::from_secs(secs));
	}
	if let Some(ms) = args.poll_interval {
		options = options.with_poll_interval(Duration::from_millis(ms));
	}

	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::info!("Cancelling relay wait");
			cancel.cancel();
		}
	});

	let delivery = if args.submit {
		service.relay_and_wait(&record, options).await?
	} else {
		service.wait_relay(&record, options).await?
	};
	Ok(describe_delivery(chain.family, &delivery))
}

pub fn decode(payload: &str) -> CommandResult {
	let batch = intent_codec::decode(&decode_hex(payload)?)?;
	Ok(describe_batch(&batch))
}

/// Builds the unsigned spoke transaction for an intent on an EVM chain.
pub async fn prepare(service: &IntentService, args: PrepareArgs) -> CommandResult {
	let chain = chain(service, args.chain_id)?;
	if chain.family != ChainFamily::Evm {
		return Err(format!(
			"prepare needs an evm chain, chain {} is {}",
			chain.chain_id, chain.family
		)
		.into());
	}

	let user = Address::parse(chain.family, &args.user)?;
	let calls = match &args.payload {
		Some(payload) => intent_codec::decode(&decode_hex(payload)?)?,
		None => CallBatch::new(),
	};

	let mut request = IntentRequest::new(calls);
	let mut amount_display = None;
	if let Some(token) = &args.token {
		let amount = args.amount.as_deref().ok_or("--amount is required with --token")?;
		let token = Address::parse(chain.family, token)?;
		let decimals = token_decimals(chain, &token)?;
		let amount = parse_token_amount(amount, decimals)?;
		amount_display = Some(format_token_amount(amount, decimals));
		request = request.with_transfer(TokenTransfer { token, amount });
	}

	let client = AlloySpokeClient::read_only(chain)?;
	let provider = SpokeProvider::new(service.registry(), chain.chain_id, user, Arc::new(client))?;
	let tx = service.prepare_raw(&provider, request).await?;
	Ok(json!({
		"amount": amount_display,
		"transaction": tx,
	}))
}

/// Decimals used to scale `--amount` for `token` on an EVM chain.
fn token_decimals(chain: &ChainConfig, token: &Address) -> Result<u8, Box<dyn Error>> {
	if let Some(config) = chain.token(token) {
		return Ok(config.decimals);
	}
	if chain.is_native_token(token) {
		return Ok(EVM_NATIVE_DECIMALS);
	}
	Err(format!("Token {} is not configured on chain {}", token, chain.chain_id).into())
}

pub fn describe_outcome(outcome: &PollOutcome) -> Value {
	match outcome {
		PollOutcome::Pending => json!({ "status": "pending" }),
		PollOutcome::Delivered(dst_tx_hash) => json!({
			"status": "delivered",
			"dst_tx_hash": dst_tx_hash,
		}),
		PollOutcome::Failed(packet) => json!({
			"status": "failed",
			"packet": packet,
		}),
	}
}

pub fn describe_delivery(family: ChainFamily, delivery: &RelayDelivery) -> Value {
	json!({
		"src_chain_id": delivery.src_chain_id.as_u64(),
		"src_tx_hash": family.format_tx_hash(&delivery.src_tx_hash),
		"dst_tx_hash": delivery.dst_tx_hash,
	})
}

pub fn describe_batch(batch: &CallBatch) -> Value {
	let calls: Vec<Value> = batch
		.calls()
		.iter()
		.map(|call| {
			json!({
				"target": call.target.to_string(),
				"value": call.value.to_string(),
				"data": alloy::hex::encode_prefixed(&call.data),
			})
		})
		.collect();
	json!({ "count": calls.len(), "calls": calls })
}
