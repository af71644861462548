//! Relay confirmation for the intent relay SDK.
//!
//! After a spoke transaction is confirmed, the relay network carries it to
//! the hub. This module submits the spoke transaction hash to the
//! relay-status API and polls it until the hub-side packet is delivered,
//! fails, or the wait times out.

use async_trait::async_trait;
use intent_types::{ChainId, RelayPacket};
use thiserror::Error;

pub mod cancel;
pub mod waiter;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

pub use cancel::{CancelHandle, CancelSignal};
pub use waiter::{PollOutcome, RelayObserver, RelayWaiter, WaitOptions};

/// Errors returned by the relay-status API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayApiError {
	/// Transient failure; the same request may succeed later.
	#[error("Relay API unavailable: {0}")]
	Retryable(String),
	/// The relay rejected the request.
	#[error("Relay API rejected request: {0}")]
	Fatal(String),
}

impl RelayApiError {
	pub fn is_retryable(&self) -> bool {
		matches!(self, RelayApiError::Retryable(_))
	}
}

/// Relay-status API.
///
/// Hashes are passed in the source chain's native text form.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RelayApi: Send + Sync {
	/// Asks the relay to pick up a confirmed spoke transaction.
	async fn submit_transaction(&self, chain_id: ChainId, tx_hash: &str)
		-> Result<(), RelayApiError>;

	/// Returns the packet for a spoke transaction, or `None` if the relay
	/// has not observed it yet.
	async fn get_packet(
		&self,
		chain_id: ChainId,
		tx_hash: &str,
	) -> Result<Option<RelayPacket>, RelayApiError>;
}
