//! Uniform error taxonomy.
//!
//! Every public operation of the SDK returns [`IntentResult`]. Callers branch
//! on [`ErrorCode`] to decide between retrying, showing a message to the user,
//! or escalating to support. Errors raised after a spoke transaction was
//! broadcast carry its hash: the spoke-side action already happened and must
//! not be submitted again.

use crate::TransactionHash;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result envelope returned by every public SDK operation.
pub type IntentResult<T> = Result<T, IntentError>;

/// Classification of an [`IntentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	ValidationFailed,
	HubQueryFailed,
	SpokeQueryFailed,
	SimulationFailed,
	SubmissionFailed,
	RelaySubmissionFailed,
	RelayTimeout,
	RelayFailed,
	Cancelled,
}

/// Errors returned by SDK operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntentError {
	/// Bad input, rejected before any network call.
	#[error("Validation failed: {0}")]
	ValidationFailed(String),
	/// The hub chain query used for wallet derivation failed.
	#[error("Hub query failed: {0}")]
	HubQueryFailed(String),
	/// A read-only spoke chain query (e.g. token allowance) failed.
	#[error("Spoke query failed: {0}")]
	SpokeQueryFailed(String),
	/// The pre-flight simulation reverted; nothing was signed or broadcast.
	#[error("Simulation failed: {reason}")]
	SimulationFailed {
		reason: String,
		/// Raw revert data, when the node returned it.
		revert_data: Option<Vec<u8>>,
	},
	/// Signing or broadcasting the spoke transaction failed.
	#[error("Submission failed: {0}")]
	SubmissionFailed(String),
	/// The spoke transaction is confirmed but the relay did not accept it.
	#[error("Relay submission failed for {}: {message}", src_tx_hash.to_hex())]
	RelaySubmissionFailed {
		src_tx_hash: TransactionHash,
		message: String,
	},
	/// No terminal packet state was observed before the deadline.
	#[error("Relay timed out after {}s waiting for {}", waited.as_secs(), src_tx_hash.to_hex())]
	RelayTimeout {
		src_tx_hash: TransactionHash,
		waited: Duration,
	},
	/// The spoke transaction is confirmed but cross-chain delivery failed.
	#[error("Relay failed for {}: {message}", src_tx_hash.to_hex())]
	RelayFailed {
		src_tx_hash: TransactionHash,
		message: String,
	},
	/// The caller stopped waiting. On-chain state is unaffected.
	#[error("Relay wait cancelled for {}", src_tx_hash.to_hex())]
	Cancelled { src_tx_hash: TransactionHash },
}

impl IntentError {
	pub fn code(&self) -> ErrorCode {
		match self {
			IntentError::ValidationFailed(_) => ErrorCode::ValidationFailed,
			IntentError::HubQueryFailed(_) => ErrorCode::HubQueryFailed,
			IntentError::SpokeQueryFailed(_) => ErrorCode::SpokeQueryFailed,
			IntentError::SimulationFailed { .. } => ErrorCode::SimulationFailed,
			IntentError::SubmissionFailed(_) => ErrorCode::SubmissionFailed,
			IntentError::RelaySubmissionFailed { .. } => ErrorCode::RelaySubmissionFailed,
			IntentError::RelayTimeout { .. } => ErrorCode::RelayTimeout,
			IntentError::RelayFailed { .. } => ErrorCode::RelayFailed,
			IntentError::Cancelled { .. } => ErrorCode::Cancelled,
		}
	}

	/// Whether the failed step can be repeated as is.
	///
	/// Only read-only steps qualify: chain queries and re-polling the relay
	/// after a timeout. Submissions are never retryable.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			IntentError::HubQueryFailed(_)
				| IntentError::SpokeQueryFailed(_)
				| IntentError::RelayTimeout { .. }
		)
	}

	/// Hash of the broadcast spoke transaction, for errors raised after broadcast.
	pub fn spoke_tx_hash(&self) -> Option<&TransactionHash> {
		match self {
			IntentError::RelaySubmissionFailed { src_tx_hash, .. }
			| IntentError::RelayTimeout { src_tx_hash, .. }
			| IntentError::RelayFailed { src_tx_hash, .. }
			| IntentError::Cancelled { src_tx_hash } => Some(src_tx_hash),
			_ => None,
		}
	}

	/// True when the spoke-side action is confirmed on chain despite the error.
	pub fn spoke_action_confirmed(&self) -> bool {
		self.spoke_tx_hash().is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_codes() {
		let hash = TransactionHash(vec![1, 2, 3]);
		let err = IntentError::RelayFailed {
			src_tx_hash: hash.clone(),
			message: "packet failed".to_string(),
		};
		assert_eq!(err.code(), ErrorCode::RelayFailed);
		assert_eq!(err.spoke_tx_hash(), Some(&hash));
		assert!(err.spoke_action_confirmed());
		assert!(!err.is_retryable());
		assert_eq!(err.to_string(), "Relay failed for 0x010203: packet failed");
	}

	#[test]
	fn test_pre_broadcast_errors_have_no_hash() {
		let err = IntentError::ValidationFailed("amount must be greater than zero".into());
		assert_eq!(err.code(), ErrorCode::ValidationFailed);
		assert!(err.spoke_tx_hash().is_none());

		let err = IntentError::HubQueryFailed("connection refused".into());
		assert!(err.is_retryable());
		assert!(!err.spoke_action_confirmed());
	}

	#[test]
	fn test_error_code_serialization() {
		let json = serde_json::to_string(&ErrorCode::RelaySubmissionFailed).unwrap();
		assert_eq!(json, "\"RELAY_SUBMISSION_FAILED\"");
	}
}
