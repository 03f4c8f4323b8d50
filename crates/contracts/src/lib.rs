//! Solidity bindings for the handful of contracts the swap client talks to.
//! Only the functions that are actually called are declared.

use alloy::sol;

sol! {
    /// Clanker's v4 position manager, which doubles as the registry mapping
    /// truncated pool ids to full pool keys.
    #[sol(rpc)]
    interface IPositionManager {
        function poolKeys(bytes25 poolId)
            external
            view
            returns (address currency0, address currency1, uint24 fee, int24 tickSpacing, address hooks);
    }
}

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    interface IWETH9 {
        function deposit() external payable;
        function withdraw(uint256 amount) external;
    }
}

sol! {
    struct PoolKey {
        address currency0;
        address currency1;
        uint24 fee;
        int24 tickSpacing;
        address hooks;
    }

    struct QuoteExactSingleParams {
        PoolKey poolKey;
        bool zeroForOne;
        uint128 exactAmount;
        bytes hookData;
    }

    /// Uniswap v4 quoter. Quotes are computed by simulating the swap and
    /// reverting, so the call must be made with `eth_call`.
    #[sol(rpc)]
    interface IV4Quoter {
        function quoteExactInputSingle(QuoteExactSingleParams memory params)
            external
            returns (uint256 amountOut, uint256 gasEstimate);
    }
}

/// Deployment addresses on Base.
pub mod base {
    use alloy::primitives::{Address, address};

    pub const V4_QUOTER: Address = address!("0x0d5e0f971ed27fbff6c2837bf31316121532048d");
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::sol_types::SolCall, hex_literal::hex};

    #[test]
    fn weth_deposit_selector() {
        assert_eq!(IWETH9::depositCall::SELECTOR, hex!("d0e30db0"));
        assert_eq!(IWETH9::depositCall {}.abi_encode(), hex!("d0e30db0"));
    }

    #[test]
    fn erc20_balance_of_selector() {
        assert_eq!(IERC20::balanceOfCall::SELECTOR, hex!("70a08231"));
    }

    #[test]
    fn pool_keys_takes_bytes25() {
        assert_eq!(IPositionManager::poolKeysCall::SIGNATURE, "poolKeys(bytes25)");
    }
}
