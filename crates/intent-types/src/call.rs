//! Contract calls executed by the hub wallet.

use crate::HubAddress;
use alloy::primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};

/// A single call the hub wallet performs on behalf of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
	/// Contract being called on the hub chain.
	pub target: HubAddress,
	/// Native value forwarded with the call.
	pub value: U256,
	/// ABI-encoded call data.
	pub data: Bytes,
}

impl ContractCall {
	pub fn new(target: HubAddress, value: U256, data: impl Into<Bytes>) -> Self {
		Self {
			target,
			value,
			data: data.into(),
		}
	}
}

/// Ordered sequence of calls executed atomically on the hub chain.
///
/// Calls run in order and later calls may depend on the side effects of
/// earlier ones (approve then transfer), so the order is part of the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallBatch(Vec<ContractCall>);

impl CallBatch {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	pub fn push(&mut self, call: ContractCall) {
		self.0.push(call);
	}

	/// Appends a call and returns the batch, for chaining.
	pub fn with_call(mut self, call: ContractCall) -> Self {
		self.0.push(call);
		self
	}

	pub fn calls(&self) -> &[ContractCall] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<ContractCall>> for CallBatch {
	fn from(calls: Vec<ContractCall>) -> Self {
		Self(calls)
	}
}

impl IntoIterator for CallBatch {
	type Item = ContractCall;
	type IntoIter = std::vec::IntoIter<ContractCall>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
