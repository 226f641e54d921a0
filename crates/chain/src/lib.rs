//! Artha chain interaction layer.
//!
//! This crate provides:
//! - Contract bindings for the investment vault, the MNT/USDC pool and ERC20
//! - Transaction signing and sending on Mantle Sepolia
//! - Vault rebalancing and position reads
//! - Pool balances, exchange rates and swaps

mod bindings;
mod investment;
mod signer;
mod swap;

pub use bindings::{IInvestment, IERC20, ISwapPool};
pub use investment::{InvestmentContract, InvestmentPosition, PoolInfo, RebalanceReceipt};
pub use signer::{
    parse_private_key, read_provider, TransactionSender, MANTLE_SEPOLIA_CHAIN_ID,
    MANTLE_SEPOLIA_RPC,
};
pub use swap::{
    derive_mnt_per_usdc, derive_usdc_quote, ExchangeRates, PoolBalances, SwapDirection, SwapPool,
    SwapResult, DEFAULT_SWAP_POOL, DEFAULT_USDC, PRICE_FEED_DECIMALS, USDC_DECIMALS,
};

pub use alloy::primitives::Address;
