//! Common types for the hub/spoke intent relay SDK.
//!
//! This crate defines the data model shared by every other crate in the
//! workspace: chain identifiers and families, family-tagged addresses,
//! contract calls, spoke transactions, relay packets, the chain registry,
//! and the uniform error taxonomy returned by every public operation.

/// Family-tagged account addresses.
pub mod address;
/// Contract calls and call batches executed on the hub chain.
pub mod call;
/// Chain identifiers and chain families.
pub mod chain;
/// Spoke transaction types produced by the submitter.
pub mod delivery;
/// Uniform error taxonomy.
pub mod error;
/// Events published while an intent moves through the pipeline.
pub mod events;
/// Chain configuration registry.
pub mod networks;
/// Relay packet and relay state types.
pub mod relay;
/// Formatting and time helpers.
pub mod utils;

pub use address::{Address, AddressError};
pub use call::{CallBatch, ContractCall};
pub use chain::{ChainFamily, ChainId};
pub use delivery::{
	DepositInstruction, SpokeTransaction, SpokeTransactionRecord, SubmitMode, TokenTransfer,
	TransactionHash, TxOutcome,
};
pub use error::{ErrorCode, IntentError, IntentResult};
pub use events::IntentEvent;
pub use networks::{ChainConfig, ChainRegistry, NetworksConfig, TokenConfig};
pub use relay::{RelayDelivery, RelayPacket, RelayState, RelayStatus};
pub use utils::{
	current_timestamp, format_token_amount, parse_token_amount, truncate_id, with_0x_prefix,
	without_0x_prefix,
};

/// Address of a contract or wallet on the hub chain.
///
/// The hub chain is always EVM family, so hub-side addresses use the alloy
/// address type directly.
pub type HubAddress = alloy::primitives::Address;
