//! Chain configuration registry.
//!
//! This module defines the static per-chain configuration the SDK reads:
//! contract addresses, native token id and supported tokens. The registry is
//! built once from configuration and shared read-only between operations.

use crate::{Address, AddressError, ChainFamily, ChainId};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Configuration for a token on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenConfig {
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
}

/// Configuration for a single chain of the deployment.
///
/// # Fields
///
/// * `asset_manager` - Spoke gateway receiving value deposits
/// * `connection` - Spoke gateway carrying messages without value
/// * `native_token` - Token id used for the chain's native currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainConfig {
	pub chain_id: ChainId,
	pub name: String,
	pub family: ChainFamily,
	pub rpc_url: String,
	pub asset_manager: Option<Address>,
	pub connection: Option<Address>,
	pub native_token: Option<Address>,
	pub tokens: Vec<TokenConfig>,
}

impl ChainConfig {
	/// Returns the configured token with the given address.
	pub fn token(&self, address: &Address) -> Option<&TokenConfig> {
		self.tokens.iter().find(|token| &token.address == address)
	}

	pub fn is_native_token(&self, address: &Address) -> bool {
		self.native_token.as_ref() == Some(address)
	}

	/// Whether deposits of `address` are supported on this chain.
	pub fn supports_token(&self, address: &Address) -> bool {
		self.is_native_token(address) || self.token(address).is_some()
	}
}

#[derive(Debug, Deserialize)]
struct TokenEntry {
	address: String,
	symbol: String,
	decimals: u8,
}

/// Chain entry as written in configuration, before addresses are parsed.
#[derive(Debug, Deserialize)]
struct ChainEntry {
	name: String,
	family: ChainFamily,
	rpc_url: String,
	asset_manager: Option<String>,
	connection: Option<String>,
	native_token: Option<String>,
	#[serde(default)]
	tokens: Vec<TokenEntry>,
}

impl ChainEntry {
	fn into_config(self, chain_id: ChainId) -> Result<ChainConfig, AddressError> {
		let family = self.family;
		let parse = |value: Option<String>| -> Result<Option<Address>, AddressError> {
			value.map(|v| Address::parse(family, &v)).transpose()
		};

		// EVM chains use the zero address for native value unless told otherwise
		let native_token = match (parse(self.native_token)?, family) {
			(Some(token), _) => Some(token),
			(None, ChainFamily::Evm) => Some(Address::from_evm(alloy::primitives::Address::ZERO)),
			(None, _) => None,
		};

		let tokens = self
			.tokens
			.into_iter()
			.map(|token| {
				Ok(TokenConfig {
					address: Address::parse(family, &token.address)?,
					symbol: token.symbol,
					decimals: token.decimals,
				})
			})
			.collect::<Result<Vec<_>, AddressError>>()?;

		Ok(ChainConfig {
			chain_id,
			name: self.name,
			family,
			rpc_url: self.rpc_url,
			asset_manager: parse(self.asset_manager)?,
			connection: parse(self.connection)?,
			native_token,
			tokens,
		})
	}
}

/// Chain configurations keyed by relay chain id.
pub type NetworksConfig = HashMap<ChainId, ChainConfig>;

/// Deserializes `[networks.<chain_id>]` tables.
///
/// TOML table keys are strings, so chain ids are parsed here, and addresses
/// are parsed with the family declared by each entry.
pub fn deserialize_networks<'de, D>(deserializer: D) -> Result<NetworksConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: HashMap<String, ChainEntry> = HashMap::deserialize(deserializer)?;
	let mut result = HashMap::new();

	for (key, entry) in string_map {
		let chain_id = key
			.parse::<u64>()
			.map(ChainId)
			.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))?;
		let config = entry.into_config(chain_id).map_err(|e| {
			serde::de::Error::custom(format!("Invalid network {}: {}", chain_id, e))
		})?;
		result.insert(chain_id, config);
	}

	Ok(result)
}

/// Read-only registry of every chain in a deployment.
///
/// Exactly one chain is the hub; every other chain is a spoke of that hub.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
	hub_chain_id: ChainId,
	chains: NetworksConfig,
}

impl ChainRegistry {
	/// Creates a registry, checking that the hub is configured and EVM family.
	pub fn new(hub_chain_id: ChainId, chains: NetworksConfig) -> Result<Self, String> {
		let hub = chains
			.get(&hub_chain_id)
			.ok_or_else(|| format!("Hub chain {} not found in networks", hub_chain_id))?;
		if hub.family != ChainFamily::Evm {
			return Err(format!(
				"Hub chain {} must be evm family, got {}",
				hub_chain_id, hub.family
			));
		}
		Ok(Self {
			hub_chain_id,
			chains,
		})
	}

	pub fn hub_chain_id(&self) -> ChainId {
		self.hub_chain_id
	}

	pub fn hub(&self) -> &ChainConfig {
		// Presence is checked in `new`
		&self.chains[&self.hub_chain_id]
	}

	pub fn is_hub(&self, chain_id: ChainId) -> bool {
		chain_id == self.hub_chain_id
	}

	pub fn get(&self, chain_id: ChainId) -> Option<&ChainConfig> {
		self.chains.get(&chain_id)
	}

	/// All chains other than the hub, ordered by chain id.
	pub fn spokes(&self) -> Vec<&ChainConfig> {
		let mut spokes: Vec<_> = self
			.chains
			.values()
			.filter(|chain| chain.chain_id != self.hub_chain_id)
			.collect();
		spokes.sort_by_key(|chain| chain.chain_id);
		spokes
	}

	pub fn token(&self, chain_id: ChainId, address: &Address) -> Option<&TokenConfig> {
		self.get(chain_id).and_then(|chain| chain.token(address))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Deserialize)]
	struct Wrapper {
		#[serde(deserialize_with = "deserialize_networks")]
		networks: NetworksConfig,
	}

	const NETWORKS: &str = r#"
[networks.146]
name = "sonic"
family = "evm"
rpc_url = "http://localhost:8545"

[networks.6]
name = "arbitrum"
family = "evm"
rpc_url = "http://localhost:8546"
asset_manager = "0x1234567890123456789012345678901234567890"
connection = "0x0987654321098765432109876543210987654321"
[[networks.6.tokens]]
address = "0xabcdef1234567890abcdef1234567890abcdef12"
symbol = "USDC"
decimals = 6

[networks.9]
name = "sui"
family = "sui"
rpc_url = "http://localhost:9000"
native_token = "0x2"
"#;

	fn registry() -> ChainRegistry {
		let wrapper: Wrapper = toml::from_str(NETWORKS).unwrap();
		ChainRegistry::new(ChainId(146), wrapper.networks).unwrap()
	}

	#[test]
	fn test_networks_deserialization() {
		let registry = registry();
		let arbitrum = registry.get(ChainId(6)).unwrap();
		assert_eq!(arbitrum.family, ChainFamily::Evm);
		assert_eq!(arbitrum.tokens.len(), 1);
		assert!(arbitrum.asset_manager.is_some());

		let usdc = &arbitrum.tokens[0].address;
		assert!(arbitrum.supports_token(usdc));
		assert_eq!(registry.token(ChainId(6), usdc).unwrap().decimals, 6);
	}

	#[test]
	fn test_evm_native_token_defaults_to_zero_address() {
		let registry = registry();
		let zero = Address::from_evm(alloy::primitives::Address::ZERO);
		assert!(registry.get(ChainId(6)).unwrap().is_native_token(&zero));

		let sui = registry.get(ChainId(9)).unwrap();
		assert_eq!(sui.native_token.as_ref().unwrap().family(), ChainFamily::Sui);
	}

	#[test]
	fn test_hub_and_spokes() {
		let registry = registry();
		assert!(registry.is_hub(ChainId(146)));
		assert_eq!(registry.hub().name, "sonic");
		let spokes: Vec<_> = registry.spokes().iter().map(|c| c.chain_id).collect();
		assert_eq!(spokes, vec![ChainId(6), ChainId(9)]);
	}

	#[test]
	fn test_registry_rejects_missing_or_non_evm_hub() {
		let wrapper: Wrapper = toml::from_str(NETWORKS).unwrap();
		assert!(ChainRegistry::new(ChainId(1), wrapper.networks.clone()).is_err());
		assert!(ChainRegistry::new(ChainId(9), wrapper.networks).is_err());
	}

	#[test]
	fn test_invalid_address_is_rejected() {
		let bad = r#"
[networks.6]
name = "arbitrum"
family = "evm"
rpc_url = "http://localhost:8546"
asset_manager = "not-an-address"
"#;
		assert!(toml::from_str::<Wrapper>(bad).is_err());
	}
}
