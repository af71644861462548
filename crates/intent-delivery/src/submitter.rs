//! Spoke transaction submitter.
//!
//! `submit` runs validate -> build -> (raw: return) -> simulate -> send. Every
//! step before `send` is free of side effects. `send` is attempted exactly
//! once and a failed broadcast is never retried here.

use crate::contracts::{IAssetManager, IConnection, IHubWallet};
use crate::{DeliveryError, SpokeAccount, SpokeProvider};
use alloy::primitives::{Bytes, U256};
use alloy::sol_types::SolCall;
use intent_types::{
	current_timestamp, truncate_id, Address, DepositInstruction, HubAddress, IntentError,
	IntentResult, SpokeTransaction, SpokeTransactionRecord, SubmitMode, TokenTransfer, TxOutcome,
};
use tracing::instrument;

/// What to submit on the spoke chain.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
	/// Hub wallet of the user, credited with deposits.
	pub hub_wallet: HubAddress,
	/// Value moved to the hub along with the payload, if any.
	pub transfer: Option<TokenTransfer>,
	/// Encoded call batch the hub wallet executes.
	pub payload: Bytes,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitOptions {
	pub mode: SubmitMode,
	pub skip_simulation: bool,
}

/// Submits an intent's spoke transaction.
///
/// In `Raw` mode the unsigned transaction is returned without touching the
/// network. In `Execute` mode it is simulated (unless skipped), then sent
/// once; the returned record holds the confirmed spoke transaction hash.
#[instrument(skip_all, fields(chain_id = %provider.chain_id(), mode = ?options.mode))]
pub async fn submit(
	provider: &SpokeProvider,
	request: SubmitRequest,
	options: SubmitOptions,
) -> IntentResult<TxOutcome> {
	validate_request(provider, &request)?;
	let tx = build_transaction(provider, &request)?;

	if options.mode == SubmitMode::Raw {
		tracing::debug!("Returning unsigned spoke transaction");
		return Ok(TxOutcome::Unsigned(tx));
	}

	let client = provider.client();

	if options.skip_simulation {
		tracing::debug!("Skipping simulation");
	} else {
		client.simulate(&tx).await.map_err(|e| match e {
			DeliveryError::Reverted {
				reason,
				revert_data,
			} => IntentError::SimulationFailed {
				reason,
				revert_data,
			},
			other => IntentError::SimulationFailed {
				reason: other.to_string(),
				revert_data: None,
			},
		})?;
	}

	let chain_id = tx.chain_id;
	let tx_hash = client.send(tx).await.map_err(|e| {
		tracing::error!(chain_id = %chain_id, error = %e, "Spoke transaction submission failed");
		IntentError::SubmissionFailed(e.to_string())
	})?;

	let formatted = provider.chain().family.format_tx_hash(&tx_hash);
	tracing::info!(
		chain_id = %chain_id,
		tx_hash = %truncate_id(&formatted),
		"Submitted spoke transaction"
	);

	Ok(TxOutcome::Submitted(SpokeTransactionRecord {
		source_chain: chain_id,
		tx_hash,
		submitted_at: current_timestamp(),
	}))
}

/// Rejects bad input before any network call.
pub fn validate_request(provider: &SpokeProvider, request: &SubmitRequest) -> IntentResult<()> {
	if request.hub_wallet.is_zero() {
		return Err(IntentError::ValidationFailed(
			"Hub wallet cannot be the zero address".into(),
		));
	}
	validate_transfer(provider, request.transfer.as_ref(), &request.payload)
}

/// Checks the transfer and payload of a request.
///
/// Needs no hub wallet, so callers can run it before resolving one.
pub fn validate_transfer(
	provider: &SpokeProvider,
	transfer: Option<&TokenTransfer>,
	payload: &[u8],
) -> IntentResult<()> {
	let chain = provider.chain();

	match transfer {
		Some(transfer) => {
			if transfer.amount.is_zero() {
				return Err(IntentError::ValidationFailed(
					"Amount must be greater than zero".into(),
				));
			}
			transfer
				.token
				.expect_family(chain.family)
				.map_err(|e| IntentError::ValidationFailed(format!("Token: {}", e)))?;
			if !chain.supports_token(&transfer.token) {
				return Err(IntentError::ValidationFailed(format!(
					"Token {} is not supported on chain {}",
					transfer.token, chain.chain_id
				)));
			}
			if provider.is_hub() && !chain.is_native_token(&transfer.token) {
				return Err(IntentError::ValidationFailed(format!(
					"Token {} must be moved by the call batch on the hub chain",
					transfer.token
				)));
			}
		},
		None => {
			if payload.is_empty() {
				return Err(IntentError::ValidationFailed(
					"Payload cannot be empty without a token transfer".into(),
				));
			}
		},
	}

	Ok(())
}

/// Builds the unsigned spoke transaction for `request`.
pub fn build_transaction(
	provider: &SpokeProvider,
	request: &SubmitRequest,
) -> IntentResult<SpokeTransaction> {
	match provider {
		SpokeProvider::Hub(account) => build_hub_call(account, request),
		SpokeProvider::Evm(account) => build_evm_spoke(account, request),
		SpokeProvider::Solana(account)
		| SpokeProvider::Stellar(account)
		| SpokeProvider::Sui(account)
		| SpokeProvider::Icon(account) => build_instruction(account, request),
	}
}

/// Checks that the asset manager may pull `amount` of `token` from the user.
///
/// Only ERC-20 deposits on EVM spokes need an allowance; native value and
/// other families always report `true`.
pub async fn is_allowance_valid(
	provider: &SpokeProvider,
	token: &Address,
	amount: U256,
) -> IntentResult<bool> {
	let SpokeProvider::Evm(account) = provider else {
		return Ok(true);
	};
	if account.chain.is_native_token(token) {
		return Ok(true);
	}

	let spender = asset_manager(account)?;
	let allowance = account
		.client
		.allowance(&account.user, token, spender)
		.await
		.map_err(|e| IntentError::SpokeQueryFailed(e.to_string()))?;

	tracing::debug!(
		chain_id = %account.chain.chain_id,
		token = %token,
		allowance = %allowance,
		required = %amount,
		"Checked allowance"
	);
	Ok(allowance >= amount)
}

fn build_hub_call(account: &SpokeAccount, request: &SubmitRequest) -> IntentResult<SpokeTransaction> {
	let value = match &request.transfer {
		Some(transfer) if account.chain.is_native_token(&transfer.token) => transfer.amount,
		Some(transfer) => {
			return Err(IntentError::ValidationFailed(format!(
				"Token {} must be moved by the call batch on the hub chain",
				transfer.token
			)));
		},
		None => U256::ZERO,
	};

	let data = IHubWallet::executeCall {
		payload: request.payload.clone(),
	}
	.abi_encode();

	Ok(SpokeTransaction {
		chain_id: account.chain.chain_id,
		from: account.user.clone(),
		to: Address::from_evm(request.hub_wallet),
		value,
		data: data.into(),
		deposit: None,
	})
}

fn build_evm_spoke(account: &SpokeAccount, request: &SubmitRequest) -> IntentResult<SpokeTransaction> {
	let chain = &account.chain;
	let hub_wallet = Bytes::copy_from_slice(request.hub_wallet.as_slice());

	match &request.transfer {
		Some(transfer) => {
			let to = asset_manager(account)?;
			let token = transfer
				.token
				.to_evm()
				.map_err(|e| IntentError::ValidationFailed(e.to_string()))?;
			let data = IAssetManager::transferCall {
				token,
				to: hub_wallet,
				amount: transfer.amount,
				data: request.payload.clone(),
			}
			.abi_encode();

			Ok(SpokeTransaction {
				chain_id: chain.chain_id,
				from: account.user.clone(),
				to: to.clone(),
				value: native_value(account, transfer),
				data: data.into(),
				deposit: Some(deposit(transfer, request)),
			})
		},
		None => {
			let to = connection(account)?;
			let data = IConnection::sendMessageCall {
				dstChainId: U256::from(account.hub_chain_id.as_u64()),
				dstAddress: hub_wallet,
				payload: request.payload.clone(),
			}
			.abi_encode();

			Ok(SpokeTransaction {
				chain_id: chain.chain_id,
				from: account.user.clone(),
				to: to.clone(),
				value: U256::ZERO,
				data: data.into(),
				deposit: None,
			})
		},
	}
}

/// Non-EVM families get the logical fields; their client builds the native
/// transaction from the deposit instruction.
fn build_instruction(
	account: &SpokeAccount,
	request: &SubmitRequest,
) -> IntentResult<SpokeTransaction> {
	let (to, value, deposit_instruction) = match &request.transfer {
		Some(transfer) => (
			asset_manager(account)?,
			native_value(account, transfer),
			Some(deposit(transfer, request)),
		),
		None => (connection(account)?, U256::ZERO, None),
	};

	Ok(SpokeTransaction {
		chain_id: account.chain.chain_id,
		from: account.user.clone(),
		to: to.clone(),
		value,
		data: request.payload.clone(),
		deposit: deposit_instruction,
	})
}

fn native_value(account: &SpokeAccount, transfer: &TokenTransfer) -> U256 {
	if account.chain.is_native_token(&transfer.token) {
		transfer.amount
	} else {
		U256::ZERO
	}
}

fn deposit(transfer: &TokenTransfer, request: &SubmitRequest) -> DepositInstruction {
	DepositInstruction {
		token: transfer.token.clone(),
		amount: transfer.amount,
		recipient: request.hub_wallet,
		payload: request.payload.clone(),
	}
}

fn asset_manager(account: &SpokeAccount) -> IntentResult<&Address> {
	account.chain.asset_manager.as_ref().ok_or_else(|| {
		IntentError::ValidationFailed(format!(
			"Chain {} has no asset manager configured",
			account.chain.chain_id
		))
	})
}

fn connection(account: &SpokeAccount) -> IntentResult<&Address> {
	account.chain.connection.as_ref().ok_or_else(|| {
		IntentError::ValidationFailed(format!(
			"Chain {} has no connection configured",
			account.chain.chain_id
		))
	})
}
