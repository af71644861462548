//! Family-tagged account addresses.
//!
//! Every chain family has its own textual address format. An [`Address`]
//! keeps the decoded bytes together with the family they belong to, so an
//! EVM address and a Sui object id with the same bytes never compare equal.
//!
//! | family  | text form                     | bytes                          |
//! |---------|-------------------------------|--------------------------------|
//! | evm     | `0x` + 40 hex                 | 20                             |
//! | solana  | base58                        | 32                             |
//! | sui     | `0x` + up to 64 hex           | 32 (left padded)               |
//! | icon    | `hx`/`cx` + 40 hex            | 21 (`0x00` hx, `0x01` cx)      |
//! | stellar | 56 char strkey (`G...`/`C...`)| UTF-8 bytes of the strkey      |

use crate::chain::ChainFamily;
use crate::utils::{with_0x_prefix, without_0x_prefix};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const EVM_ADDRESS_LENGTH: usize = 20;
const SOLANA_ADDRESS_LENGTH: usize = 32;
const SUI_ADDRESS_LENGTH: usize = 32;
const STELLAR_STRKEY_LENGTH: usize = 56;

const ICON_EOA_TAG: u8 = 0x00;
const ICON_CONTRACT_TAG: u8 = 0x01;

/// Errors that can occur when parsing an address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
	#[error("Invalid {family} address '{value}': {reason}")]
	Invalid {
		family: ChainFamily,
		value: String,
		reason: String,
	},
	#[error("Expected {expected} address, got {actual}")]
	FamilyMismatch {
		expected: ChainFamily,
		actual: ChainFamily,
	},
}

/// Account identifier tagged with the chain family it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
	family: ChainFamily,
	bytes: Vec<u8>,
}

impl Address {
	/// Parses an address from the family's native text form.
	pub fn parse(family: ChainFamily, value: &str) -> Result<Self, AddressError> {
		let invalid = |reason: &str| AddressError::Invalid {
			family,
			value: value.to_string(),
			reason: reason.to_string(),
		};

		let bytes = match family {
			ChainFamily::Evm => {
				let bytes = hex::decode(without_0x_prefix(value))
					.map_err(|e| invalid(&e.to_string()))?;
				if bytes.len() != EVM_ADDRESS_LENGTH {
					return Err(invalid("expected 20 bytes"));
				}
				bytes
			},
			ChainFamily::Solana => {
				let bytes = bs58::decode(value)
					.into_vec()
					.map_err(|e| invalid(&e.to_string()))?;
				if bytes.len() != SOLANA_ADDRESS_LENGTH {
					return Err(invalid("expected 32 bytes"));
				}
				bytes
			},
			ChainFamily::Sui => {
				let digits = without_0x_prefix(value);
				if digits.is_empty() || digits.len() > SUI_ADDRESS_LENGTH * 2 {
					return Err(invalid("expected 1 to 64 hex digits"));
				}
				let padded = format!("{:0>64}", digits);
				hex::decode(padded).map_err(|e| invalid(&e.to_string()))?
			},
			ChainFamily::Icon => {
				let (tag, digits) = if let Some(rest) = value.strip_prefix("hx") {
					(ICON_EOA_TAG, rest)
				} else if let Some(rest) = value.strip_prefix("cx") {
					(ICON_CONTRACT_TAG, rest)
				} else {
					return Err(invalid("expected hx or cx prefix"));
				};
				let body = hex::decode(digits).map_err(|e| invalid(&e.to_string()))?;
				if body.len() != EVM_ADDRESS_LENGTH {
					return Err(invalid("expected 20 bytes after prefix"));
				}
				let mut bytes = Vec::with_capacity(EVM_ADDRESS_LENGTH + 1);
				bytes.push(tag);
				bytes.extend_from_slice(&body);
				bytes
			},
			ChainFamily::Stellar => {
				if value.len() != STELLAR_STRKEY_LENGTH {
					return Err(invalid("expected 56 characters"));
				}
				if !(value.starts_with('G') || value.starts_with('C')) {
					return Err(invalid("expected G or C prefix"));
				}
				if !value
					.bytes()
					.all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b))
				{
					return Err(invalid("not a base32 strkey"));
				}
				value.as_bytes().to_vec()
			},
		};

		Ok(Self { family, bytes })
	}

	/// Wraps an EVM address.
	pub fn from_evm(address: alloy::primitives::Address) -> Self {
		Self {
			family: ChainFamily::Evm,
			bytes: address.as_slice().to_vec(),
		}
	}

	pub fn family(&self) -> ChainFamily {
		self.family
	}

	/// Raw address bytes, as passed to the hub wallet factory.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Returns the address as an alloy EVM address.
	pub fn to_evm(&self) -> Result<alloy::primitives::Address, AddressError> {
		self.expect_family(ChainFamily::Evm)?;
		Ok(alloy::primitives::Address::from_slice(&self.bytes))
	}

	/// Fails unless this address belongs to `family`.
	pub fn expect_family(&self, family: ChainFamily) -> Result<(), AddressError> {
		if self.family != family {
			return Err(AddressError::FamilyMismatch {
				expected: family,
				actual: self.family,
			});
		}
		Ok(())
	}

	/// True for the EVM zero address, which chains use as the native token id.
	pub fn is_zero(&self) -> bool {
		self.bytes.iter().all(|b| *b == 0)
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.family {
			ChainFamily::Evm => {
				let checksummed = alloy::primitives::Address::from_slice(&self.bytes);
				write!(f, "{}", checksummed)
			},
			ChainFamily::Solana => f.write_str(&bs58::encode(&self.bytes).into_string()),
			ChainFamily::Sui => f.write_str(&with_0x_prefix(&hex::encode(&self.bytes))),
			ChainFamily::Icon => {
				let prefix = if self.bytes[0] == ICON_CONTRACT_TAG {
					"cx"
				} else {
					"hx"
				};
				write!(f, "{}{}", prefix, hex::encode(&self.bytes[1..]))
			},
			ChainFamily::Stellar => f.write_str(&String::from_utf8_lossy(&self.bytes)),
		}
	}
}

impl Serialize for Address {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}
