//! Wallet factory reader backed by an alloy HTTP provider.

use crate::{WalletError, WalletFactoryReader};
use alloy::primitives::{Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use intent_types::{ChainRegistry, HubAddress};

sol! {
	interface IWalletFactory {
		function getDeployedAddress(uint256 chainId, bytes user) external view returns (address);
	}
}

/// Queries `getDeployedAddress` on the hub wallet factory.
pub struct AlloyWalletFactory {
	provider: DynProvider,
	factory: HubAddress,
}

impl AlloyWalletFactory {
	pub fn new(provider: DynProvider, factory: HubAddress) -> Self {
		Self { provider, factory }
	}

	/// Connects to the hub chain RPC configured in `registry`.
	pub fn connect(registry: &ChainRegistry, factory: HubAddress) -> Result<Self, WalletError> {
		let hub = registry.hub();
		let url = hub.rpc_url.parse().map_err(|e| {
			WalletError::Network(format!("Invalid RPC URL for hub chain {}: {}", hub.chain_id, e))
		})?;

		let provider = ProviderBuilder::new().connect_http(url).erased();
		Ok(Self::new(provider, factory))
	}
}

#[async_trait]
impl WalletFactoryReader for AlloyWalletFactory {
	async fn get_deployed_address(
		&self,
		spoke_chain: u64,
		user: &[u8],
	) -> Result<HubAddress, WalletError> {
		let call = IWalletFactory::getDeployedAddressCall {
			chainId: U256::from(spoke_chain),
			user: Bytes::copy_from_slice(user),
		};
		let request = TransactionRequest::default()
			.to(self.factory)
			.input(TransactionInput::new(call.abi_encode().into()));

		let output = self.provider.call(request).await.map_err(|e| {
			WalletError::Network(format!("Failed to call getDeployedAddress: {}", e))
		})?;

		IWalletFactory::getDeployedAddressCall::abi_decode_returns(&output)
			.map_err(|e| WalletError::InvalidResponse(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::address;
	use alloy::sol_types::SolValue;
	use serde_json::json;
	use wiremock::matchers::{body_partial_json, method};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn reader(server: &MockServer) -> AlloyWalletFactory {
		let url = server.uri().parse().unwrap();
		let provider = ProviderBuilder::new().connect_http(url).erased();
		AlloyWalletFactory::new(provider, address!("C67AB69bB9Ab1dB83bEB12F1A2bB3a8E04C7f112"))
	}

	#[tokio::test]
	async fn test_decodes_factory_response() {
		let server = MockServer::start().await;
		let wallet = address!("00000000000000000000000000000000000000aa");
		let encoded = alloy::hex::encode_prefixed(wallet.abi_encode());

		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_call"})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"jsonrpc": "2.0",
				"id": 0,
				"result": encoded
			})))
			.expect(1)
			.mount(&server)
			.await;

		let resolved = reader(&server)
			.get_deployed_address(42161, &[0x12; 20])
			.await
			.unwrap();
		assert_eq!(resolved, wallet);
	}

	#[tokio::test]
	async fn test_rpc_error_is_network_error() {
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(503))
			.mount(&server)
			.await;

		let result = reader(&server).get_deployed_address(42161, &[0x12; 20]).await;
		assert!(matches!(result, Err(WalletError::Network(_))));
	}

	#[tokio::test]
	async fn test_short_response_is_invalid() {
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_call"})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"jsonrpc": "2.0",
				"id": 0,
				"result": "0x1234"
			})))
			.mount(&server)
			.await;

		let result = reader(&server).get_deployed_address(42161, &[0x12; 20]).await;
		assert!(matches!(result, Err(WalletError::InvalidResponse(_))));
	}
}
