//! Spoke chain client for EVM chains using the Alloy library.
//!
//! Simulation is an `eth_call` of the built transaction; revert data returned
//! by the node is kept so callers can decode the contract error. Sending
//! signs with the provider's wallet and waits for the receipt.

use crate::contracts::IERC20;
use crate::{DeliveryError, SpokeChainClient};
use alloy::network::EthereumWallet;
use alloy::primitives::U256;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use intent_types::{
	truncate_id, with_0x_prefix, Address, ChainConfig, ChainId, SpokeTransaction, TransactionHash,
};

/// Alloy-based EVM spoke client.
///
/// One instance serves one chain. Clients built with [`Self::read_only`]
/// can simulate and query allowances but fail to send.
pub struct AlloySpokeClient {
	chain_id: ChainId,
	provider: DynProvider,
}

impl AlloySpokeClient {
	pub fn new(chain_id: ChainId, provider: DynProvider) -> Self {
		Self { chain_id, provider }
	}

	/// Connects to `chain` with a signing wallet.
	pub fn connect(chain: &ChainConfig, signer: PrivateKeySigner) -> Result<Self, DeliveryError> {
		let url = chain.rpc_url.parse().map_err(|e| invalid_rpc_url(chain, e))?;
		let wallet = EthereumWallet::from(signer);

		let provider = ProviderBuilder::new()
			.wallet(wallet)
			.connect_http(url)
			.erased();
		Ok(Self::new(chain.chain_id, provider))
	}

	/// Connects to `chain` without a signer.
	pub fn read_only(chain: &ChainConfig) -> Result<Self, DeliveryError> {
		let url = chain.rpc_url.parse().map_err(|e| invalid_rpc_url(chain, e))?;
		let provider = ProviderBuilder::new().connect_http(url).erased();
		Ok(Self::new(chain.chain_id, provider))
	}

	fn request(&self, tx: &SpokeTransaction) -> Result<TransactionRequest, DeliveryError> {
		if tx.chain_id != self.chain_id {
			return Err(DeliveryError::Unsupported(format!(
				"Transaction for chain {} sent to client for chain {}",
				tx.chain_id, self.chain_id
			)));
		}
		let from = tx
			.from
			.to_evm()
			.map_err(|e| DeliveryError::Unsupported(e.to_string()))?;
		let to = tx
			.to
			.to_evm()
			.map_err(|e| DeliveryError::Unsupported(e.to_string()))?;

		Ok(TransactionRequest::default()
			.from(from)
			.to(to)
			.value(tx.value)
			.input(TransactionInput::new(tx.data.clone())))
	}
}

fn invalid_rpc_url(chain: &ChainConfig, error: impl std::fmt::Display) -> DeliveryError {
	DeliveryError::Network(format!(
		"Invalid RPC URL for network {}: {}",
		chain.chain_id, error
	))
}

/// Splits node errors into reverts (with revert data when present) and
/// transport failures.
fn classify_call_error(error: RpcError<TransportErrorKind>) -> DeliveryError {
	match error.as_error_resp() {
		Some(payload) => DeliveryError::Reverted {
			reason: payload.message.to_string(),
			revert_data: payload.as_revert_data().map(|data| data.to_vec()),
		},
		None => DeliveryError::Network(error.to_string()),
	}
}

#[async_trait]
impl SpokeChainClient for AlloySpokeClient {
	async fn simulate(&self, tx: &SpokeTransaction) -> Result<(), DeliveryError> {
		let request = self.request(tx)?;
		self.provider
			.call(request)
			.await
			.map_err(classify_call_error)?;

		tracing::debug!(chain_id = %self.chain_id, "Simulation succeeded");
		Ok(())
	}

	async fn send(&self, tx: SpokeTransaction) -> Result<TransactionHash, DeliveryError> {
		let request = self.request(&tx)?;

		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to send transaction: {}", e)))?;

		let tx_hash = *pending_tx.tx_hash();
		let hash_str = with_0x_prefix(&hex::encode(tx_hash.0));
		tracing::info!(
			tx_hash = %truncate_id(&hash_str),
			chain_id = %self.chain_id,
			"Broadcast transaction, waiting for receipt"
		);

		let receipt = pending_tx.get_receipt().await.map_err(|e| {
			DeliveryError::Network(format!("Failed to get receipt for {}: {}", hash_str, e))
		})?;

		if !receipt.status() {
			return Err(DeliveryError::TransactionFailed(format!(
				"Transaction {} reverted",
				hash_str
			)));
		}

		Ok(TransactionHash(tx_hash.0.to_vec()))
	}

	async fn allowance(
		&self,
		owner: &Address,
		token: &Address,
		spender: &Address,
	) -> Result<U256, DeliveryError> {
		let owner = owner
			.to_evm()
			.map_err(|e| DeliveryError::Unsupported(format!("Invalid owner address: {}", e)))?;
		let token = token
			.to_evm()
			.map_err(|e| DeliveryError::Unsupported(format!("Invalid token address: {}", e)))?;
		let spender = spender
			.to_evm()
			.map_err(|e| DeliveryError::Unsupported(format!("Invalid spender address: {}", e)))?;

		let call = IERC20::allowanceCall { owner, spender };
		let request = TransactionRequest::default()
			.to(token)
			.input(TransactionInput::new(call.abi_encode().into()));

		let output = self
			.provider
			.call(request)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to call allowance: {}", e)))?;

		IERC20::allowanceCall::abi_decode_returns(&output)
			.map_err(|e| DeliveryError::Network(format!("Invalid allowance response: {}", e)))
	}
}
