//! Hub wallet abstraction.
//!
//! Every spoke user owns a counterfactual wallet on the hub chain. Its address
//! is derived by a read-only wallet factory query on the hub from the spoke
//! chain id and the user's raw spoke address, so the same inputs always give
//! the same hub wallet.

use async_trait::async_trait;
use intent_types::{
	truncate_id, Address, ChainId, ChainRegistry, HubAddress, IntentError, IntentResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur while querying the hub wallet factory.
#[derive(Debug, Error)]
pub enum WalletError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// The factory returned data that could not be decoded.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

/// Read-only access to the hub wallet factory.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WalletFactoryReader: Send + Sync {
	/// Returns the hub wallet for `user` on spoke chain `spoke_chain`.
	///
	/// The wallet need not be deployed yet.
	async fn get_deployed_address(
		&self,
		spoke_chain: u64,
		user: &[u8],
	) -> Result<HubAddress, WalletError>;
}

/// Resolves spoke users to their hub wallets.
#[derive(Clone)]
pub struct WalletResolver {
	registry: Arc<ChainRegistry>,
	reader: Arc<dyn WalletFactoryReader>,
}

impl WalletResolver {
	pub fn new(registry: Arc<ChainRegistry>, reader: Arc<dyn WalletFactoryReader>) -> Self {
		Self { registry, reader }
	}

	/// Resolves the hub wallet of `user` on `spoke_chain`.
	///
	/// Unknown chains and addresses of the wrong family are rejected before
	/// the hub is queried. Query failures map to `HubQueryFailed`.
	pub async fn resolve(&self, spoke_chain: ChainId, user: &Address) -> IntentResult<HubAddress> {
		self.validate(spoke_chain, user)?;

		let hub_wallet = self
			.reader
			.get_deployed_address(spoke_chain.as_u64(), user.as_bytes())
			.await
			.map_err(|e| IntentError::HubQueryFailed(e.to_string()))?;

		tracing::debug!(
			chain_id = %spoke_chain,
			user = %truncate_id(&user.to_string()),
			hub_wallet = %hub_wallet,
			"Resolved hub wallet"
		);

		Ok(hub_wallet)
	}

	/// Starts a resolution scope memoizing results for one logical operation.
	pub fn scope(&self) -> ResolutionScope<'_> {
		ResolutionScope {
			resolver: self,
			resolved: HashMap::new(),
		}
	}

	/// Checks that `user` may be resolved on `spoke_chain` without any network call.
	pub fn validate(&self, spoke_chain: ChainId, user: &Address) -> IntentResult<()> {
		let chain = self.registry.get(spoke_chain).ok_or_else(|| {
			IntentError::ValidationFailed(format!("Chain {} is not configured", spoke_chain))
		})?;
		user.expect_family(chain.family)
			.map_err(|e| IntentError::ValidationFailed(e.to_string()))
	}
}

/// Memoizes hub wallet resolutions for the lifetime of one operation.
///
/// Results depend only on the deployment's factory, so reusing them within an
/// operation is safe. Failures are not cached.
pub struct ResolutionScope<'a> {
	resolver: &'a WalletResolver,
	resolved: HashMap<(ChainId, Address), HubAddress>,
}

impl ResolutionScope<'_> {
	pub async fn resolve(&mut self, spoke_chain: ChainId, user: &Address) -> IntentResult<HubAddress> {
		let key = (spoke_chain, user.clone());
		if let Some(hub_wallet) = self.resolved.get(&key) {
			return Ok(*hub_wallet);
		}

		let hub_wallet = self.resolver.resolve(spoke_chain, user).await?;
		self.resolved.insert(key, hub_wallet);
		Ok(hub_wallet)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::address;
	use intent_types::{ChainConfig, ChainFamily, ErrorCode};

	fn chain(chain_id: u64, family: ChainFamily) -> ChainConfig {
		ChainConfig {
			chain_id: ChainId(chain_id),
			name: format!("chain-{}", chain_id),
			family,
			rpc_url: "http://localhost:8545".to_string(),
			asset_manager: None,
			connection: None,
			native_token: None,
			tokens: vec![],
		}
	}

	fn registry() -> Arc<ChainRegistry> {
		let chains = [
			chain(146, ChainFamily::Evm),
			chain(42161, ChainFamily::Evm),
			chain(501, ChainFamily::Solana),
		]
		.into_iter()
		.map(|c| (c.chain_id, c))
		.collect();
		Arc::new(ChainRegistry::new(ChainId(146), chains).unwrap())
	}

	fn evm_user() -> Address {
		Address::parse(ChainFamily::Evm, "0x1234567890123456789012345678901234567890").unwrap()
	}

	const HUB_WALLET: HubAddress = address!("00000000000000000000000000000000000000aa");

	#[tokio::test]
	async fn test_resolve_passes_chain_and_raw_address() {
		let user = evm_user();
		let expected_bytes = user.as_bytes().to_vec();

		let mut reader = MockWalletFactoryReader::new();
		reader
			.expect_get_deployed_address()
			.withf(move |chain, bytes| *chain == 42161 && bytes == expected_bytes.as_slice())
			.times(2)
			.returning(|_, _| Ok(HUB_WALLET));

		let resolver = WalletResolver::new(registry(), Arc::new(reader));
		let first = resolver.resolve(ChainId(42161), &user).await.unwrap();
		let second = resolver.resolve(ChainId(42161), &user).await.unwrap();
		assert_eq!(first, HUB_WALLET);
		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn test_network_failure_is_hub_query_failed() {
		let mut reader = MockWalletFactoryReader::new();
		reader
			.expect_get_deployed_address()
			.returning(|_, _| Err(WalletError::Network("connection refused".into())));

		let resolver = WalletResolver::new(registry(), Arc::new(reader));
		let err = resolver
			.resolve(ChainId(42161), &evm_user())
			.await
			.unwrap_err();
		assert_eq!(err.code(), ErrorCode::HubQueryFailed);
		assert!(err.is_retryable());
	}

	#[tokio::test]
	async fn test_validation_happens_before_query() {
		let mut reader = MockWalletFactoryReader::new();
		reader.expect_get_deployed_address().never();
		let resolver = WalletResolver::new(registry(), Arc::new(reader));

		let err = resolver.resolve(ChainId(7), &evm_user()).await.unwrap_err();
		assert_eq!(err.code(), ErrorCode::ValidationFailed);

		// EVM address on a Solana chain
		let err = resolver.resolve(ChainId(501), &evm_user()).await.unwrap_err();
		assert_eq!(err.code(), ErrorCode::ValidationFailed);
	}

	#[tokio::test]
	async fn test_scope_memoizes_successes() {
		let mut reader = MockWalletFactoryReader::new();
		reader
			.expect_get_deployed_address()
			.times(1)
			.returning(|_, _| Ok(HUB_WALLET));

		let resolver = WalletResolver::new(registry(), Arc::new(reader));
		let mut scope = resolver.scope();
		let user = evm_user();
		assert_eq!(scope.resolve(ChainId(42161), &user).await.unwrap(), HUB_WALLET);
		assert_eq!(scope.resolve(ChainId(42161), &user).await.unwrap(), HUB_WALLET);
	}

	#[tokio::test]
	async fn test_scope_does_not_cache_failures() {
		let mut reader = MockWalletFactoryReader::new();
		let mut seq = mockall::Sequence::new();
		reader
			.expect_get_deployed_address()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Err(WalletError::Network("timeout".into())));
		reader
			.expect_get_deployed_address()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|_, _| Ok(HUB_WALLET));

		let resolver = WalletResolver::new(registry(), Arc::new(reader));
		let mut scope = resolver.scope();
		let user = evm_user();
		assert!(scope.resolve(ChainId(42161), &user).await.is_err());
		assert_eq!(scope.resolve(ChainId(42161), &user).await.unwrap(), HUB_WALLET);
	}
}
