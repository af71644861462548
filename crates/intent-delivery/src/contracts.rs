//! Spoke gateway and hub wallet contract interfaces.

use alloy::sol;

sol! {
	/// Spoke gateway receiving value deposits bound for the hub.
	interface IAssetManager {
		function transfer(address token, bytes to, uint256 amount, bytes data) external payable;
	}

	/// Spoke gateway carrying messages without value.
	interface IConnection {
		function sendMessage(uint256 dstChainId, bytes dstAddress, bytes payload) external;
	}

	/// Hub wallet executing an encoded call batch.
	interface IHubWallet {
		function execute(bytes payload) external payable;
	}

	interface IERC20 {
		function allowance(address owner, address spender) external view returns (uint256);
	}
}
