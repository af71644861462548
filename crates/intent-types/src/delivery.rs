//! Spoke transaction types.
//!
//! This module defines what the spoke submitter produces: the unsigned
//! transaction it builds, the record it returns once a transaction is
//! broadcast, and the outcome type covering both submission modes.

use crate::{Address, ChainId, HubAddress};
use alloy::primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};

/// Blockchain transaction hash representation.
///
/// Stores transaction hashes as raw bytes to support different blockchain formats.
/// Use [`crate::ChainFamily::format_tx_hash`] to render it for a given chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

impl TransactionHash {
	/// Hex rendering with 0x prefix, used in logs.
	pub fn to_hex(&self) -> String {
		crate::with_0x_prefix(&hex::encode(&self.0))
	}
}

/// Token movement requested alongside an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenTransfer {
	/// Token on the spoke chain. The chain's native token id means native value.
	pub token: Address,
	/// Amount in the token's smallest unit.
	pub amount: U256,
}

/// Logical deposit fields shared by every chain family.
///
/// EVM clients get a fully encoded `data` field; clients for other families
/// build their native transaction shape from these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositInstruction {
	pub token: Address,
	pub amount: U256,
	/// Hub wallet credited with the deposit.
	pub recipient: HubAddress,
	/// Encoded call batch executed by the hub wallet.
	pub payload: Bytes,
}

/// Unsigned spoke-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpokeTransaction {
	pub chain_id: ChainId,
	pub from: Address,
	/// Gateway (asset manager or connection) or, on the hub, the hub wallet.
	pub to: Address,
	pub value: U256,
	pub data: Bytes,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deposit: Option<DepositInstruction>,
}

/// Record of a broadcast spoke transaction.
///
/// Once this exists the user's spoke-side action has happened; every later
/// failure must carry the hash so relay can be retried without resubmitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpokeTransactionRecord {
	pub source_chain: ChainId,
	pub tx_hash: TransactionHash,
	/// Unix timestamp in seconds.
	pub submitted_at: u64,
}

/// How the submitter should finish a spoke transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMode {
	/// Simulate, sign, broadcast and wait for the confirmed hash.
	#[default]
	Execute,
	/// Return the unsigned transaction for external signing and broadcast.
	Raw,
}

/// Result of a spoke submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxOutcome {
	Submitted(SpokeTransactionRecord),
	Unsigned(SpokeTransaction),
}

impl TxOutcome {
	pub fn record(&self) -> Option<&SpokeTransactionRecord> {
		match self {
			TxOutcome::Submitted(record) => Some(record),
			TxOutcome::Unsigned(_) => None,
		}
	}
}
