//! Spoke transaction delivery for the intent relay SDK.
//!
//! This module builds, simulates and submits the spoke-chain transaction that
//! carries an intent to the hub: a deposit into the chain's asset manager, a
//! message through its connection, or a direct call of the hub wallet when
//! the user is already on the hub chain.

use alloy::primitives::U256;
use async_trait::async_trait;
use intent_types::{Address, SpokeTransaction, TransactionHash};
use thiserror::Error;

pub mod contracts;
pub mod provider;
pub mod submitter;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub use provider::{SpokeAccount, SpokeProvider};
pub use submitter::{
	build_transaction, is_allowance_valid, submit, validate_request, validate_transfer,
	SubmitOptions, SubmitRequest,
};

/// Errors reported by spoke chain clients.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The node reported that the transaction reverts.
	#[error("Execution reverted: {reason}")]
	Reverted {
		reason: String,
		revert_data: Option<Vec<u8>>,
	},
	/// The transaction was mined but failed, or could not be signed.
	#[error("Transaction failed: {0}")]
	TransactionFailed(String),
	/// The client cannot handle this transaction shape.
	#[error("Unsupported: {0}")]
	Unsupported(String),
}

/// Chain access needed to submit spoke transactions.
///
/// EVM chains use [`implementations::evm::alloy::AlloySpokeClient`]; other
/// families plug in their own client and build their native transaction
/// from [`SpokeTransaction::deposit`].
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SpokeChainClient: Send + Sync {
	/// Dry-runs the transaction against current chain state.
	async fn simulate(&self, tx: &SpokeTransaction) -> Result<(), DeliveryError>;

	/// Signs and broadcasts the transaction, returning once it is confirmed.
	async fn send(&self, tx: SpokeTransaction) -> Result<TransactionHash, DeliveryError>;

	/// ERC-20 style allowance `owner` granted to `spender` for `token`.
	async fn allowance(
		&self,
		owner: &Address,
		token: &Address,
		spender: &Address,
	) -> Result<U256, DeliveryError>;
}
