//! Call builders for common hub-side token operations.
//!
//! Domain encoders compose these into batches, e.g. approve a pool and then
//! supply to it.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use intent_types::ContractCall;

sol! {
	interface IERC20 {
		function approve(address spender, uint256 amount) external returns (bool);
		function transfer(address to, uint256 amount) external returns (bool);
	}
}

/// `token.approve(spender, amount)`.
pub fn approve(token: Address, spender: Address, amount: U256) -> ContractCall {
	let data = IERC20::approveCall { spender, amount }.abi_encode();
	ContractCall::new(token, U256::ZERO, data)
}

/// `token.transfer(to, amount)`.
pub fn transfer(token: Address, to: Address, amount: U256) -> ContractCall {
	let data = IERC20::transferCall { to, amount }.abi_encode();
	ContractCall::new(token, U256::ZERO, data)
}

/// Plain native value transfer from the hub wallet.
pub fn native_transfer(to: Address, amount: U256) -> ContractCall {
	ContractCall::new(to, amount, Bytes::new())
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::address;

	#[test]
	fn test_approve_selector() {
		let token = address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
		let spender = address!("D8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
		let call = approve(token, spender, U256::from(5u64));

		assert_eq!(call.target, token);
		assert_eq!(call.value, U256::ZERO);
		// approve(address,uint256)
		assert_eq!(&call.data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
		assert_eq!(call.data.len(), 4 + 32 + 32);
	}

	#[test]
	fn test_transfer_selector() {
		let token = address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
		let call = transfer(token, Address::ZERO, U256::from(1u64));
		// transfer(address,uint256)
		assert_eq!(&call.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
	}

	#[test]
	fn test_native_transfer_has_no_data() {
		let call = native_transfer(Address::ZERO, U256::from(10u64));
		assert!(call.data.is_empty());
		assert_eq!(call.value, U256::from(10u64));
	}
}
