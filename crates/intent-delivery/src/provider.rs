//! Spoke providers.
//!
//! A [`SpokeProvider`] binds a user to one configured chain and the client
//! that talks to it. The variant encodes the chain family, so adding a family
//! forces every builder to handle it.

use crate::SpokeChainClient;
use intent_types::{
	Address, ChainConfig, ChainFamily, ChainId, ChainRegistry, IntentError, IntentResult,
};
use std::sync::Arc;

/// A user's account on one chain of the deployment.
#[derive(Clone)]
pub struct SpokeAccount {
	pub chain: ChainConfig,
	/// Hub chain the account's intents execute on.
	pub hub_chain_id: ChainId,
	pub user: Address,
	pub client: Arc<dyn SpokeChainClient>,
}

/// One variant per chain family. `Hub` is the hub chain itself.
#[derive(Clone)]
pub enum SpokeProvider {
	Evm(SpokeAccount),
	Hub(SpokeAccount),
	Solana(SpokeAccount),
	Stellar(SpokeAccount),
	Sui(SpokeAccount),
	Icon(SpokeAccount),
}

impl SpokeProvider {
	/// Creates the provider for `user` on `chain_id`.
	///
	/// Fails if the chain is not configured or the user address belongs to a
	/// different family than the chain.
	pub fn new(
		registry: &ChainRegistry,
		chain_id: ChainId,
		user: Address,
		client: Arc<dyn SpokeChainClient>,
	) -> IntentResult<Self> {
		let chain = registry.get(chain_id).ok_or_else(|| {
			IntentError::ValidationFailed(format!("Chain {} is not configured", chain_id))
		})?;
		user.expect_family(chain.family)
			.map_err(|e| IntentError::ValidationFailed(e.to_string()))?;

		let account = SpokeAccount {
			chain: chain.clone(),
			hub_chain_id: registry.hub_chain_id(),
			user,
			client,
		};

		Ok(if registry.is_hub(chain_id) {
			SpokeProvider::Hub(account)
		} else {
			match account.chain.family {
				ChainFamily::Evm => SpokeProvider::Evm(account),
				ChainFamily::Solana => SpokeProvider::Solana(account),
				ChainFamily::Stellar => SpokeProvider::Stellar(account),
				ChainFamily::Sui => SpokeProvider::Sui(account),
				ChainFamily::Icon => SpokeProvider::Icon(account),
			}
		})
	}

	pub fn account(&self) -> &SpokeAccount {
		match self {
			SpokeProvider::Evm(account)
			| SpokeProvider::Hub(account)
			| SpokeProvider::Solana(account)
			| SpokeProvider::Stellar(account)
			| SpokeProvider::Sui(account)
			| SpokeProvider::Icon(account) => account,
		}
	}

	pub fn chain(&self) -> &ChainConfig {
		&self.account().chain
	}

	pub fn chain_id(&self) -> ChainId {
		self.account().chain.chain_id
	}

	pub fn user(&self) -> &Address {
		&self.account().user
	}

	pub fn client(&self) -> &Arc<dyn SpokeChainClient> {
		&self.account().client
	}

	pub fn is_hub(&self) -> bool {
		matches!(self, SpokeProvider::Hub(_))
	}
}
