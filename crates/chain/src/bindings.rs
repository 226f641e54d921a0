//! Contract interfaces for the Artha investment vault and the MNT/USDC pool.
//!
//! Only the ABI surface is defined here; the contracts themselves are
//! deployed and owned elsewhere.

use alloy::sol;

// Investment vault: holds user MNT deposits and rebalances between MNT and USDC
sol! {
    /// Investment vault interface
    #[sol(rpc)]
    #[derive(Debug)]
    interface IInvestment {
        event Rebalanced(string action, uint256 amount);

        function FEE_DENOMINATOR() external view returns (uint256);
        function WITHDRAW_FEE() external view returns (uint256);

        function deposit() external payable;
        function withdraw() external;

        /// mode: 0 = hold, 1 = buy MNT, 2 = sell MNT
        function rebalance(uint8 mode) external;

        function getUserInvestmentInfo(address user) external view returns (
            uint256 userDepositMNT,
            uint256 userCurrentValue,
            uint256 totalPoolValue
        );

        function owner() external view returns (address);
        function swapper() external view returns (address);
        function totalShares() external view returns (uint256);
        function usdc() external view returns (address);
        function userShares(address user) external view returns (uint256);
    }
}

// Zero-fee MNT/USDC pool priced from a Chainlink-style MNT/USD feed
sol! {
    /// MNT/USDC swap pool interface
    #[sol(rpc)]
    #[derive(Debug)]
    interface ISwapPool {
        event SwapMNTToUSDC(address indexed user, uint256 mntIn, uint256 usdcOut);
        event SwapUSDCToMNT(address indexed user, uint256 usdcIn, uint256 mntOut);

        function getLatestMNTUSD() external view returns (int256 price);
        function getQuoteMNTToUSDC(uint256 mntIn) external view returns (uint256 usdcOut);
        function getQuoteUSDCToMNT(uint256 usdcIn) external view returns (uint256 mntOut);
        function mntUsdPriceFeed() external view returns (address);
        function swapMNTToUSDC() external payable returns (uint256 usdcOut);
        function swapUSDCToMNT(uint256 usdcIn) external returns (uint256 mntOut);
        function usdc() external view returns (address);
    }
}

// ERC20 subset for USDC balance and allowance handling
sol! {
    /// Standard ERC20 interface (subset)
    #[sol(rpc)]
    #[derive(Debug)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use alloy::sol_types::{SolCall, SolEvent};

    #[test]
    fn test_rebalance_signature() {
        assert_eq!(IInvestment::rebalanceCall::SIGNATURE, "rebalance(uint8)");

        let encoded = IInvestment::rebalanceCall { mode: 2 }.abi_encode();
        // selector + one 32-byte word
        assert_eq!(encoded.len(), 4 + 32);
        assert_eq!(&encoded[..4], &IInvestment::rebalanceCall::SELECTOR);
        assert_eq!(encoded[35], 2);
    }

    #[test]
    fn test_view_signatures() {
        assert_eq!(
            IInvestment::getUserInvestmentInfoCall::SIGNATURE,
            "getUserInvestmentInfo(address)"
        );
        assert_eq!(ISwapPool::swapUSDCToMNTCall::SIGNATURE, "swapUSDCToMNT(uint256)");
        assert_eq!(ISwapPool::swapMNTToUSDCCall::SIGNATURE, "swapMNTToUSDC()");
    }

    #[test]
    fn test_event_signatures() {
        assert_eq!(IInvestment::Rebalanced::SIGNATURE, "Rebalanced(string,uint256)");
        assert_eq!(
            ISwapPool::SwapMNTToUSDC::SIGNATURE,
            "SwapMNTToUSDC(address,uint256,uint256)"
        );
        assert_ne!(
            ISwapPool::SwapMNTToUSDC::SIGNATURE_HASH,
            ISwapPool::SwapUSDCToMNT::SIGNATURE_HASH
        );
    }

    #[test]
    fn test_approve_encoding() {
        let call = IERC20::approveCall {
            spender: Address::ZERO,
            amount: U256::MAX,
        };
        assert_eq!(call.abi_encode().len(), 4 + 64);
    }
}
