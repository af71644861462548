//! Event types published while an intent moves through the pipeline.
//!
//! Events let callers and tests observe progress, including failures of
//! detached side tasks that are never propagated as errors.

use crate::{ChainId, ErrorCode, HubAddress, RelayState, TransactionHash};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntentEvent {
	/// The hub wallet for a spoke user was resolved.
	WalletResolved {
		chain_id: ChainId,
		hub_wallet: HubAddress,
	},
	/// A spoke transaction was broadcast and confirmed on the spoke chain.
	TransactionSubmitted {
		chain_id: ChainId,
		tx_hash: TransactionHash,
	},
	/// The relay wait moved to a new state.
	RelayStateChanged {
		tx_hash: TransactionHash,
		state: RelayState,
	},
	/// The intent executed on the hub chain.
	Delivered {
		src_tx_hash: TransactionHash,
		dst_tx_hash: String,
	},
	/// The pipeline ended with an error.
	Failed {
		code: ErrorCode,
		message: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		src_tx_hash: Option<TransactionHash>,
	},
	/// A detached side task failed. The main operation is unaffected.
	DetachedTaskFailed { task: String, error: String },
}
