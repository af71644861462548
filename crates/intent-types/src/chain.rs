//! Chain identifiers and chain families.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::delivery::TransactionHash;
use crate::utils::{with_0x_prefix, without_0x_prefix};

/// Numeric relay chain identifier.
///
/// This is the id the relay network and the hub wallet factory use for a
/// chain, not necessarily the chain's native id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
	pub fn as_u64(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<u64> for ChainId {
	fn from(id: u64) -> Self {
		Self(id)
	}
}

/// Blockchain family a chain belongs to.
///
/// The family decides how addresses and transaction hashes are encoded and
/// which transaction shape the spoke submitter builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
	Evm,
	Solana,
	Stellar,
	Sui,
	Icon,
}

impl ChainFamily {
	pub fn as_str(&self) -> &'static str {
		match self {
			ChainFamily::Evm => "evm",
			ChainFamily::Solana => "solana",
			ChainFamily::Stellar => "stellar",
			ChainFamily::Sui => "sui",
			ChainFamily::Icon => "icon",
		}
	}

	/// Renders a transaction hash the way explorers and the relay expect it.
	///
	/// Solana signatures and Sui digests are base58, Stellar hashes are bare
	/// hex, EVM and Icon hashes are 0x-prefixed hex.
	pub fn format_tx_hash(&self, hash: &TransactionHash) -> String {
		match self {
			ChainFamily::Solana | ChainFamily::Sui => bs58::encode(&hash.0).into_string(),
			ChainFamily::Stellar => hex::encode(&hash.0),
			ChainFamily::Evm | ChainFamily::Icon => with_0x_prefix(&hex::encode(&hash.0)),
		}
	}

	/// Parses a transaction hash from its family-specific text form.
	pub fn parse_tx_hash(&self, value: &str) -> Result<TransactionHash, String> {
		let bytes = match self {
			ChainFamily::Solana => bs58::decode(value)
				.into_vec()
				.map_err(|e| format!("invalid base58 signature: {}", e))?,
			ChainFamily::Sui => bs58::decode(value)
				.into_vec()
				.map_err(|e| format!("invalid base58 digest: {}", e))?,
			ChainFamily::Evm | ChainFamily::Icon | ChainFamily::Stellar => {
				hex::decode(without_0x_prefix(value))
					.map_err(|e| format!("invalid hex transaction hash: {}", e))?
			},
		};
		if bytes.is_empty() {
			return Err("transaction hash cannot be empty".to_string());
		}
		Ok(TransactionHash(bytes))
	}
}

impl fmt::Display for ChainFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ChainFamily {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"evm" => Ok(Self::Evm),
			"solana" => Ok(Self::Solana),
			"stellar" => Ok(Self::Stellar),
			"sui" => Ok(Self::Sui),
			"icon" => Ok(Self::Icon),
			other => Err(format!("Unknown chain family '{}'", other)),
		}
	}
}
