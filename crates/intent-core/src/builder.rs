//! Builds an [`IntentService`] from configuration.
//!
//! Components default to the HTTP and alloy implementations named by the
//! configuration; each one can be replaced before building.

use crate::implementations::http::HttpExecutionNotifier;
use crate::{EventBus, ExecutionNotifier, IntentService};
use intent_config::Config;
use intent_relay::implementations::http::HttpRelayApi;
use intent_relay::{RelayApi, RelayWaiter};
use intent_wallet::implementations::evm::alloy::AlloyWalletFactory;
use intent_wallet::{WalletFactoryReader, WalletResolver};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building an intent service.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Failed to create {component}: {message}")]
	Component {
		component: &'static str,
		message: String,
	},
}

pub struct IntentServiceBuilder {
	config: Config,
	reader: Option<Arc<dyn WalletFactoryReader>>,
	relay_api: Option<Arc<dyn RelayApi>>,
	notifier: Option<Arc<dyn ExecutionNotifier>>,
	event_bus: Option<EventBus>,
}

impl IntentServiceBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			reader: None,
			relay_api: None,
			notifier: None,
			event_bus: None,
		}
	}

	pub fn with_wallet_factory(mut self, reader: Arc<dyn WalletFactoryReader>) -> Self {
		self.reader = Some(reader);
		self
	}

	pub fn with_relay_api(mut self, relay_api: Arc<dyn RelayApi>) -> Self {
		self.relay_api = Some(relay_api);
		self
	}

	pub fn with_notifier(mut self, notifier: Arc<dyn ExecutionNotifier>) -> Self {
		self.notifier = Some(notifier);
		self
	}

	pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
		self.event_bus = Some(event_bus);
		self
	}

	pub fn build(self) -> Result<IntentService, BuilderError> {
		let config = self.config;
		let registry = Arc::new(
			config
				.registry()
				.map_err(|e| BuilderError::Config(e.to_string()))?,
		);

		let reader = match self.reader {
			Some(reader) => reader,
			None => Arc::new(
				AlloyWalletFactory::connect(&registry, config.hub.wallet_factory).map_err(|e| {
					BuilderError::Component {
						component: "wallet factory",
						message: e.to_string(),
					}
				})?,
			),
		};

		let relay_api = match self.relay_api {
			Some(relay_api) => relay_api,
			None => Arc::new(HttpRelayApi::from_config(&config.relay).map_err(|e| {
				BuilderError::Component {
					component: "relay API",
					message: e.to_string(),
				}
			})?),
		};

		let notifier = match (self.notifier, &config.solver) {
			(Some(notifier), _) => Some(notifier),
			(None, Some(solver)) => {
				let notifier = HttpExecutionNotifier::from_config(solver).map_err(|e| {
					BuilderError::Component {
						component: "execution notifier",
						message: e.to_string(),
					}
				})?;
				Some(Arc::new(notifier) as Arc<dyn ExecutionNotifier>)
			},
			(None, None) => None,
		};

		let resolver = WalletResolver::new(registry.clone(), reader);
		let relay = RelayWaiter::new(relay_api, registry.clone(), &config.relay);
		let event_bus = self.event_bus.unwrap_or_default();

		tracing::info!(
			hub_chain_id = %registry.hub_chain_id(),
			spokes = registry.spokes().len(),
			simulate = config.submission.simulate,
			notifier = notifier.is_some(),
			"Built intent service"
		);

		let service = IntentService::new(registry, resolver, relay, event_bus)
			.with_simulation(config.submission.simulate);
		Ok(match notifier {
			Some(notifier) => service.with_notifier(notifier),
			None => service,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use intent_types::{Address, ChainFamily, ChainId};
	use intent_wallet::MockWalletFactoryReader;

	const CONFIG: &str = r#"
[hub]
chain_id = 146
wallet_factory = "0x00000000000000000000000000000000000000f1"

[networks.146]
name = "sonic"
family = "evm"
rpc_url = "http://localhost:8545"

[networks.42161]
name = "arbitrum"
family = "evm"
rpc_url = "http://localhost:8546"
asset_manager = "0x1111111111111111111111111111111111111111"
connection = "0x2222222222222222222222222222222222222222"

[relay]
endpoint = "http://localhost:9000"

[solver]
endpoint = "http://localhost:9100"
"#;

	#[test]
	fn test_builds_default_components_from_config() {
		let config: Config = CONFIG.parse().unwrap();
		let service = IntentServiceBuilder::new(config).build().unwrap();

		assert_eq!(service.registry().hub_chain_id(), ChainId(146));
		assert!(service.registry().get(ChainId(42161)).is_some());
	}

	#[tokio::test]
	async fn test_resolves_through_injected_factory() {
		let mut reader = MockWalletFactoryReader::new();
		reader
			.expect_get_deployed_address()
			.withf(|chain, _| *chain == 42161)
			.times(1)
			.returning(|_, _| Ok(alloy::primitives::Address::repeat_byte(0xaa)));

		let config: Config = CONFIG.parse().unwrap();
		let service = IntentServiceBuilder::new(config)
			.with_wallet_factory(Arc::new(reader))
			.build()
			.unwrap();

		let user = Address::parse(
			ChainFamily::Evm,
			"0x1234567890123456789012345678901234567890",
		)
		.unwrap();
		let hub_wallet = service
			.resolve_wallet(ChainId(42161), &user)
			.await
			.unwrap();
		assert_eq!(hub_wallet, alloy::primitives::Address::repeat_byte(0xaa));
	}
}
