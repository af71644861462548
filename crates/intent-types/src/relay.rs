//! Relay packet and relay state types.
//!
//! Packets are created and mutated only by the relay network; this SDK reads
//! them by polling the relay-status API.

use crate::{ChainId, TransactionHash};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Delivery status of a relay packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayStatus {
	Pending,
	Delivered,
	Failed,
}

impl RelayStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			RelayStatus::Pending => "pending",
			RelayStatus::Delivered => "delivered",
			RelayStatus::Failed => "failed",
		}
	}

	/// Maps a relay status string. Intermediate statuses the relay reports
	/// while processing ("validating", "executing", ...) are pending.
	pub fn from_wire(value: &str) -> Self {
		match value.to_ascii_lowercase().as_str() {
			"delivered" | "executed" => RelayStatus::Delivered,
			"failed" => RelayStatus::Failed,
			_ => RelayStatus::Pending,
		}
	}
}

impl Serialize for RelayStatus {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for RelayStatus {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		Ok(RelayStatus::from_wire(&value))
	}
}

/// The relay network's record of one cross-chain delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPacket {
	#[serde(deserialize_with = "deserialize_wire_chain_id")]
	pub src_chain_id: ChainId,
	pub src_tx_hash: String,
	#[serde(deserialize_with = "deserialize_wire_chain_id")]
	pub dst_chain_id: ChainId,
	#[serde(default)]
	pub dst_tx_hash: Option<String>,
	pub status: RelayStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub conn_sn: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub src_address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dst_address: Option<String>,
}

impl RelayPacket {
	/// Destination hash of a delivered packet.
	///
	/// Returns `None` unless the packet is delivered and carries a non-empty
	/// destination hash.
	pub fn delivered_hash(&self) -> Option<&str> {
		if self.status != RelayStatus::Delivered {
			return None;
		}
		self.dst_tx_hash.as_deref().filter(|hash| !hash.is_empty())
	}
}

/// Relays report chain ids either as JSON numbers or as decimal strings.
fn deserialize_wire_chain_id<'de, D>(deserializer: D) -> Result<ChainId, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum WireChainId {
		Number(u64),
		Text(String),
	}

	match WireChainId::deserialize(deserializer)? {
		WireChainId::Number(id) => Ok(ChainId(id)),
		WireChainId::Text(text) => text
			.parse::<u64>()
			.map(ChainId)
			.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", text, e))),
	}
}

/// States of the relay wait state machine.
///
/// `Submitted -> AwaitingPacket -> {Delivered | TimedOut | RelayFailed}`;
/// `Cancelled` is entered when the caller stops waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayState {
	Submitted,
	AwaitingPacket,
	Delivered,
	TimedOut,
	RelayFailed,
	Cancelled,
}

impl RelayState {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, RelayState::Submitted | RelayState::AwaitingPacket)
	}
}

impl fmt::Display for RelayState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			RelayState::Submitted => "SUBMITTED",
			RelayState::AwaitingPacket => "AWAITING_PACKET",
			RelayState::Delivered => "DELIVERED",
			RelayState::TimedOut => "TIMED_OUT",
			RelayState::RelayFailed => "RELAY_FAILED",
			RelayState::Cancelled => "CANCELLED",
		};
		f.write_str(name)
	}
}

/// Successful terminal outcome of a relay wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayDelivery {
	pub src_chain_id: ChainId,
	pub src_tx_hash: TransactionHash,
	/// Hub transaction hash as reported by the relay. Equal to the rendered
	/// source hash for same-chain operations.
	pub dst_tx_hash: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_packet_deserialization() {
		let packet: RelayPacket = serde_json::from_value(json!({
			"src_chain_id": "6",
			"src_tx_hash": "0x01",
			"dst_chain_id": 146,
			"dst_tx_hash": "0xabc",
			"status": "delivered",
			"conn_sn": 42
		}))
		.unwrap();

		assert_eq!(packet.src_chain_id, ChainId(6));
		assert_eq!(packet.dst_chain_id, ChainId(146));
		assert_eq!(packet.status, RelayStatus::Delivered);
		assert_eq!(packet.delivered_hash(), Some("0xabc"));
		assert_eq!(packet.conn_sn, Some(42));
	}

	#[test]
	fn test_intermediate_status_is_pending() {
		assert_eq!(RelayStatus::from_wire("validating"), RelayStatus::Pending);
		assert_eq!(RelayStatus::from_wire("executing"), RelayStatus::Pending);
		assert_eq!(RelayStatus::from_wire("FAILED"), RelayStatus::Failed);
	}

	#[test]
	fn test_delivered_without_hash_is_not_delivered() {
		let packet: RelayPacket = serde_json::from_value(json!({
			"src_chain_id": 6,
			"src_tx_hash": "0x01",
			"dst_chain_id": 146,
			"dst_tx_hash": null,
			"status": "delivered"
		}))
		.unwrap();
		assert_eq!(packet.delivered_hash(), None);
	}

	#[test]
	fn test_terminal_states() {
		assert!(!RelayState::Submitted.is_terminal());
		assert!(!RelayState::AwaitingPacket.is_terminal());
		assert!(RelayState::Delivered.is_terminal());
		assert!(RelayState::Cancelled.is_terminal());
		assert_eq!(RelayState::TimedOut.to_string(), "TIMED_OUT");
	}
}
