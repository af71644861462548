//! Configuration module for the intent relay SDK.
//!
//! This module provides structures and utilities for managing the SDK
//! configuration: the hub chain, every configured network, the relay API and
//! submission behaviour. Configuration is loaded from TOML files and validated
//! before use.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files for better organization:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

pub use loader::ConfigLoader;

use intent_types::{
	networks::deserialize_networks, ChainFamily, ChainId, ChainRegistry, HubAddress,
	NetworksConfig,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the SDK.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Hub chain and its wallet factory.
	pub hub: HubConfig,
	/// Hub and spoke chain configurations, keyed by relay chain id.
	#[serde(deserialize_with = "deserialize_networks")]
	pub networks: NetworksConfig,
	/// Relay API endpoint and wait defaults.
	pub relay: RelayConfig,
	/// Spoke submission behaviour.
	#[serde(default)]
	pub submission: SubmissionConfig,
	/// Optional solver execution endpoint notified after delivery.
	pub solver: Option<SolverConfig>,
}

/// Hub chain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubConfig {
	/// Relay chain id of the hub chain.
	pub chain_id: u64,
	/// Wallet factory deriving hub wallets for spoke users.
	pub wallet_factory: HubAddress,
}

/// Configuration for the relay API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
	/// Base URL of the relay API.
	pub endpoint: String,
	/// Default time to wait for a packet to reach a terminal state.
	/// Defaults to 60 seconds if not specified.
	#[serde(default = "default_relay_timeout_seconds")]
	pub timeout_seconds: u64,
	/// Default delay between packet status polls.
	/// Defaults to 2000 milliseconds if not specified.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}

impl RelayConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_seconds)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

impl Default for RelayConfig {
	fn default() -> Self {
		Self {
			endpoint: String::new(),
			timeout_seconds: default_relay_timeout_seconds(),
			poll_interval_ms: default_poll_interval_ms(),
		}
	}
}

fn default_relay_timeout_seconds() -> u64 {
	60
}

fn default_poll_interval_ms() -> u64 {
	2000
}

/// Configuration for spoke transaction submission.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionConfig {
	/// Whether transactions are simulated before broadcast.
	/// Defaults to true if not specified.
	#[serde(default = "default_simulate")]
	pub simulate: bool,
}

impl Default for SubmissionConfig {
	fn default() -> Self {
		Self {
			simulate: default_simulate(),
		}
	}
}

fn default_simulate() -> bool {
	true
}

/// Configuration for the solver execution endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolverConfig {
	/// Base URL; intents are posted to `{endpoint}/execute`.
	pub endpoint: String,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following include directives.
	///
	/// Each top-level section must be unique across all configuration files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	pub fn hub_chain_id(&self) -> ChainId {
		ChainId(self.hub.chain_id)
	}

	/// Builds the read-only chain registry described by this configuration.
	pub fn registry(&self) -> Result<ChainRegistry, ConfigError> {
		ChainRegistry::new(self.hub_chain_id(), self.networks.clone())
			.map_err(ConfigError::Validation)
	}

	/// Validates the configuration.
	///
	/// - The hub chain is configured and EVM family
	/// - Every network has a name and an RPC URL
	/// - The relay endpoint is an http(s) URL
	/// - Relay timeout is within 1..=3600 seconds
	/// - Poll interval is within 100..=60000 ms and below the timeout
	/// - The solver endpoint, if present, is an http(s) URL
	fn validate(&self) -> Result<(), ConfigError> {
		if self.networks.is_empty() {
			return Err(ConfigError::Validation(
				"Networks configuration cannot be empty".into(),
			));
		}

		let hub = self.networks.get(&self.hub_chain_id()).ok_or_else(|| {
			ConfigError::Validation(format!(
				"Hub chain {} not found in networks",
				self.hub.chain_id
			))
		})?;
		if hub.family != ChainFamily::Evm {
			return Err(ConfigError::Validation(format!(
				"Hub chain {} must be evm family, got {}",
				self.hub.chain_id, hub.family
			)));
		}
		if self.hub.wallet_factory.is_zero() {
			return Err(ConfigError::Validation(
				"Hub wallet_factory cannot be the zero address".into(),
			));
		}

		for (chain_id, network) in &self.networks {
			if network.name.is_empty() {
				return Err(ConfigError::Validation(format!(
					"Network {} must have a name",
					chain_id
				)));
			}
			if network.rpc_url.is_empty() {
				return Err(ConfigError::Validation(format!(
					"Network {} must have rpc_url",
					chain_id
				)));
			}
		}

		// Validate relay config
		if self.relay.endpoint.is_empty() {
			return Err(ConfigError::Validation(
				"Relay endpoint cannot be empty".into(),
			));
		}
		if !is_http_url(&self.relay.endpoint) {
			return Err(ConfigError::Validation(format!(
				"Relay endpoint '{}' must start with http:// or https://",
				self.relay.endpoint
			)));
		}
		if self.relay.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"Relay timeout_seconds must be greater than 0".into(),
			));
		}
		if self.relay.timeout_seconds > 3600 {
			return Err(ConfigError::Validation(
				"Relay timeout_seconds cannot exceed 3600 (1 hour)".into(),
			));
		}
		if !(100..=60_000).contains(&self.relay.poll_interval_ms) {
			return Err(ConfigError::Validation(
				"Relay poll_interval_ms must be between 100 and 60000".into(),
			));
		}
		if self.relay.poll_interval() >= self.relay.timeout() {
			return Err(ConfigError::Validation(
				"Relay poll_interval_ms must be shorter than timeout_seconds".into(),
			));
		}

		if let Some(ref solver) = self.solver {
			if !is_http_url(&solver.endpoint) {
				return Err(ConfigError::Validation(format!(
					"Solver endpoint '{}' must start with http:// or https://",
					solver.endpoint
				)));
			}
		}

		Ok(())
	}
}

fn is_http_url(value: &str) -> bool {
	value.starts_with("http://") || value.starts_with("https://")
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = r#"
[hub]
chain_id = 146
wallet_factory = "0xC67AB69bB9Ab1dB83bEB12F1A2bB3a8E04C7f112"

[networks.146]
name = "sonic"
family = "evm"
rpc_url = "http://localhost:8545"

[networks.42161]
name = "arbitrum"
family = "evm"
rpc_url = "http://localhost:8546"
asset_manager = "0x1234567890123456789012345678901234567890"
connection = "0x0987654321098765432109876543210987654321"
[[networks.42161.tokens]]
address = "0xabcdef1234567890abcdef1234567890abcdef12"
symbol = "USDC"
decimals = 6
"#;

	fn with_relay(relay: &str) -> String {
		format!("{}\n{}", BASE, relay)
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("TEST_RELAY_HOST", "localhost");
		std::env::set_var("TEST_RELAY_PORT", "8080");

		let input = "endpoint = \"http://${TEST_RELAY_HOST}:${TEST_RELAY_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "endpoint = \"http://localhost:8080\"");

		std::env::remove_var("TEST_RELAY_HOST");
		std::env::remove_var("TEST_RELAY_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_RELAY_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_RELAY_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_RELAY_VAR"));
	}

	#[test]
	fn test_defaults_applied() {
		let config: Config = with_relay("[relay]\nendpoint = \"https://relay.test/api\"")
			.parse()
			.unwrap();

		assert_eq!(config.relay.timeout(), Duration::from_secs(60));
		assert_eq!(config.relay.poll_interval(), Duration::from_millis(2000));
		assert!(config.submission.simulate);
		assert!(config.solver.is_none());

		let registry = config.registry().unwrap();
		assert_eq!(registry.hub_chain_id(), ChainId(146));
		assert_eq!(registry.spokes().len(), 1);
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("TEST_RELAY_ENDPOINT", "https://relay.env/api");

		let config: Config = with_relay(
			r#"
[relay]
endpoint = "${TEST_RELAY_ENDPOINT}"
timeout_seconds = ${TEST_RELAY_TIMEOUT:-120}

[solver]
endpoint = "https://solver.test"
"#,
		)
		.parse()
		.unwrap();

		assert_eq!(config.relay.endpoint, "https://relay.env/api");
		assert_eq!(config.relay.timeout_seconds, 120);
		assert_eq!(config.solver.unwrap().endpoint, "https://solver.test");

		std::env::remove_var("TEST_RELAY_ENDPOINT");
	}

	#[test]
	fn test_missing_hub_network_rejected() {
		let config = BASE.replace("[hub]\nchain_id = 146", "[hub]\nchain_id = 1");
		let result = with_relay_str(&config, "[relay]\nendpoint = \"https://relay.test\"");
		let error = result.unwrap_err().to_string();
		assert!(error.contains("Hub chain 1 not found"));
	}

	fn with_relay_str(base: &str, relay: &str) -> Result<Config, ConfigError> {
		format!("{}\n{}", base, relay).parse()
	}

	#[test]
	fn test_non_evm_hub_rejected() {
		let config = r#"
[hub]
chain_id = 1
wallet_factory = "0xC67AB69bB9Ab1dB83bEB12F1A2bB3a8E04C7f112"

[networks.1]
name = "sui"
family = "sui"
rpc_url = "http://localhost:9000"

[relay]
endpoint = "https://relay.test"
"#;
		let error = config.parse::<Config>().unwrap_err().to_string();
		assert!(error.contains("must be evm family"));
	}

	#[test]
	fn test_relay_bounds_rejected() {
		let cases = [
			("[relay]\nendpoint = \"\"", "cannot be empty"),
			("[relay]\nendpoint = \"ftp://relay\"", "http://"),
			(
				"[relay]\nendpoint = \"https://relay\"\ntimeout_seconds = 0",
				"greater than 0",
			),
			(
				"[relay]\nendpoint = \"https://relay\"\ntimeout_seconds = 7200",
				"cannot exceed 3600",
			),
			(
				"[relay]\nendpoint = \"https://relay\"\npoll_interval_ms = 10",
				"between 100 and 60000",
			),
			(
				"[relay]\nendpoint = \"https://relay\"\ntimeout_seconds = 5\npoll_interval_ms = 5000",
				"shorter than timeout_seconds",
			),
		];

		for (relay, expected) in cases {
			let result: Result<Config, _> = with_relay(relay).parse();
			let error = result.unwrap_err().to_string();
			assert!(error.contains(expected), "{} should mention {}", error, expected);
		}
	}

	#[test]
	fn test_missing_rpc_url_rejected() {
		let config = BASE.replace("rpc_url = \"http://localhost:8546\"", "rpc_url = \"\"");
		let result = with_relay_str(&config, "[relay]\nendpoint = \"https://relay.test\"");
		assert!(result.unwrap_err().to_string().contains("must have rpc_url"));
	}

	#[test]
	fn test_submission_override() {
		let config: Config = with_relay(
			"[relay]\nendpoint = \"https://relay.test\"\n\n[submission]\nsimulate = false",
		)
		.parse()
		.unwrap();
		assert!(!config.submission.simulate);
	}
}
