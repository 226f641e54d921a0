//! MNT/USDC pool wrapper: balances, exchange rates and swaps.
//!
//! Rates fall back to derived or fixed values when the pool's views are
//! unavailable.

use std::sync::Arc;

use alloy::network::ReceiptResponse;
use alloy::primitives::{
    utils::{format_ether, format_units, parse_ether, parse_units},
    Address, I256, U256,
};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::bindings::{IERC20, ISwapPool};
use crate::signer::TransactionSender;

/// USDC decimals.
pub const USDC_DECIMALS: u8 = 6;

/// Decimals of the MNT/USD price feed.
pub const PRICE_FEED_DECIMALS: u8 = 8;

/// Feed price used when the oracle read fails: 0.5 USD with 8 decimals.
const FALLBACK_PRICE_RAW: u64 = 50_000_000;

/// Default pool deployment on Mantle Sepolia.
pub const DEFAULT_SWAP_POOL: Address =
    alloy::primitives::address!("0x0140633989e6ebe5974d7d261f8009c42cd2a40b");

/// Default USDC token on Mantle Sepolia.
pub const DEFAULT_USDC: Address =
    alloy::primitives::address!("0xacab8129e2ce587fd203fd770ec9ecafa2c88080");

/// Signer and pool balances, formatted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolBalances {
    pub mnt_balance: String,
    pub usdc_balance: String,
    pub contract_mnt_balance: String,
    pub contract_usdc_balance: String,
}

impl PoolBalances {
    fn zero() -> Self {
        Self {
            mnt_balance: "0".to_string(),
            usdc_balance: "0".to_string(),
            contract_mnt_balance: "0".to_string(),
            contract_usdc_balance: "0".to_string(),
        }
    }
}

/// Pool price and unit quotes, formatted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    pub mnt_price: String,
    /// USDC received for 1 MNT
    pub mnt_to_usdc_quote: String,
    /// MNT received for 1 USDC
    pub usdc_to_mnt_quote: String,
    pub fee_percentage: String,
}

impl ExchangeRates {
    /// Rates served when the pool cannot be reached at all.
    pub fn fallback() -> Self {
        Self {
            mnt_price: "0.50".to_string(),
            mnt_to_usdc_quote: "0.50".to_string(),
            usdc_to_mnt_quote: "2.0".to_string(),
            fee_percentage: "0".to_string(),
        }
    }
}

/// Direction of a pool swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    MntToUsdc,
    UsdcToMnt,
}

/// Confirmed swap.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub direction: SwapDirection,
    /// Amount received, formatted in the output token
    pub amount_out: String,
    pub tx_hash: String,
}

/// USDC out for `mnt_in` wei at a feed price with 8 decimals.
pub fn derive_usdc_quote(price_raw: U256, mnt_in: U256) -> U256 {
    // mnt (18) * price (8) -> usdc (6)
    mnt_in * price_raw / U256::from(10u64).pow(U256::from(18 + PRICE_FEED_DECIMALS - USDC_DECIMALS))
}

/// MNT wei out for 1 USDC at a feed price with 8 decimals.
pub fn derive_mnt_per_usdc(price_raw: U256) -> Option<U256> {
    if price_raw.is_zero() {
        return None;
    }
    Some(U256::from(10u64).pow(U256::from(18 + PRICE_FEED_DECIMALS)) / price_raw)
}

/// Swap pool wrapper bound to a signer.
#[derive(Debug, Clone)]
pub struct SwapPool {
    pub address: Address,
    fallback_usdc: Address,
    sender: Arc<TransactionSender>,
}

impl SwapPool {
    /// Create a pool wrapper.
    pub fn new(address: Address, fallback_usdc: Address, sender: Arc<TransactionSender>) -> Self {
        Self {
            address,
            fallback_usdc,
            sender,
        }
    }

    fn pool(&self) -> ISwapPool::ISwapPoolInstance<alloy::providers::DynProvider> {
        ISwapPool::new(self.address, self.sender.provider().clone())
    }

    /// USDC token used by the pool, or the configured fallback.
    async fn usdc_address(&self) -> Address {
        match self.pool().usdc().call().await {
            Ok(addr) => addr,
            Err(e) => {
                warn!(error = %e, fallback = %self.fallback_usdc, "Couldn't read USDC address from pool");
                self.fallback_usdc
            }
        }
    }

    /// Signer and pool balances; zeros when the chain is unreachable.
    #[instrument(skip(self), fields(pool = %self.address))]
    pub async fn balances(&self) -> PoolBalances {
        match self.try_balances().await {
            Ok(balances) => balances,
            Err(e) => {
                warn!(error = %e, "Error getting balances");
                PoolBalances::zero()
            }
        }
    }

    async fn try_balances(&self) -> Result<PoolBalances> {
        use alloy::providers::Provider;

        let provider = self.sender.provider();
        let usdc = IERC20::new(self.usdc_address().await, provider.clone());

        let mnt_balance = provider.get_balance(self.sender.address).await?;
        let usdc_balance = usdc.balanceOf(self.sender.address).call().await?;
        let contract_mnt_balance = provider.get_balance(self.address).await?;
        let contract_usdc_balance = match usdc.balanceOf(self.address).call().await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(error = %e, "Error getting pool USDC balance");
                U256::ZERO
            }
        };

        Ok(PoolBalances {
            mnt_balance: format_ether(mnt_balance),
            usdc_balance: format_units(usdc_balance, USDC_DECIMALS)?,
            contract_mnt_balance: format_ether(contract_mnt_balance),
            contract_usdc_balance: format_units(contract_usdc_balance, USDC_DECIMALS)?,
        })
    }

    /// Feed price and 1-unit quotes in both directions.
    #[instrument(skip(self), fields(pool = %self.address))]
    pub async fn exchange_rates(&self) -> ExchangeRates {
        match self.try_exchange_rates().await {
            Ok(rates) => rates,
            Err(e) => {
                warn!(error = %e, "Error in exchange rates, serving fallback");
                ExchangeRates::fallback()
            }
        }
    }

    async fn try_exchange_rates(&self) -> Result<ExchangeRates> {
        let pool = self.pool();

        let price_raw = match pool.getLatestMNTUSD().call().await {
            Ok(price) if price > I256::ZERO => price.into_raw(),
            Ok(price) => {
                warn!(price = %price, "Non-positive MNT/USD price, using fallback");
                U256::from(FALLBACK_PRICE_RAW)
            }
            Err(e) => {
                warn!(error = %e, "Could not get latest MNT/USD price, using fallback");
                U256::from(FALLBACK_PRICE_RAW)
            }
        };

        let one_mnt = parse_ether("1")?;
        let mnt_to_usdc = match pool.getQuoteMNTToUSDC(one_mnt).call().await {
            Ok(quote) => quote,
            Err(e) => {
                warn!(error = %e, "Could not get MNT to USDC quote, deriving from price");
                derive_usdc_quote(price_raw, one_mnt)
            }
        };

        let one_usdc: U256 = parse_units("1", USDC_DECIMALS)?.get_absolute();
        let usdc_to_mnt = match pool.getQuoteUSDCToMNT(one_usdc).call().await {
            Ok(quote) => quote,
            Err(e) => {
                warn!(error = %e, "Could not get USDC to MNT quote, deriving from price");
                match derive_mnt_per_usdc(price_raw) {
                    Some(quote) => quote,
                    None => parse_ether("2")?,
                }
            }
        };

        Ok(ExchangeRates {
            mnt_price: format_units(price_raw, PRICE_FEED_DECIMALS)?,
            mnt_to_usdc_quote: format_units(mnt_to_usdc, USDC_DECIMALS)?,
            usdc_to_mnt_quote: format_ether(usdc_to_mnt),
            fee_percentage: "0".to_string(),
        })
    }

    /// Swap `amount` (decimal string in the input token) through the pool.
    pub async fn swap(&self, direction: SwapDirection, amount: &str) -> Result<SwapResult> {
        match direction {
            SwapDirection::MntToUsdc => self.swap_mnt_to_usdc(amount).await,
            SwapDirection::UsdcToMnt => self.swap_usdc_to_mnt(amount).await,
        }
    }

    /// Sell MNT for USDC.
    #[instrument(skip(self), fields(pool = %self.address))]
    pub async fn swap_mnt_to_usdc(&self, mnt_amount: &str) -> Result<SwapResult> {
        let pool = self.pool();
        let mnt_in = parse_ether(mnt_amount).with_context(|| format!("invalid MNT amount: {mnt_amount}"))?;

        let expected = pool.getQuoteMNTToUSDC(mnt_in).call().await.ok();

        let receipt = pool
            .swapMNTToUSDC()
            .value(mnt_in)
            .send()
            .await?
            .get_receipt()
            .await?;

        if !receipt.status() {
            anyhow::bail!("Transaction reverted: {}", receipt.transaction_hash);
        }

        let from_event = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<ISwapPool::SwapMNTToUSDC>().ok())
            .map(|log| log.inner.data.usdcOut)
            .filter(|out| !out.is_zero());

        let usdc_out = match from_event.or(expected) {
            Some(out) => out,
            None => {
                // No event, no quote: estimate at 0.50 USD per MNT
                let estimate = mnt_in * U256::from(FALLBACK_PRICE_RAW);
                estimate / U256::from(10u64).pow(U256::from(18 + PRICE_FEED_DECIMALS - USDC_DECIMALS))
            }
        };

        info!(
            tx_hash = %receipt.transaction_hash,
            mnt_in = %mnt_amount,
            usdc_out = %usdc_out,
            "Swapped MNT to USDC"
        );

        Ok(SwapResult {
            direction: SwapDirection::MntToUsdc,
            amount_out: format_units(usdc_out, USDC_DECIMALS)?,
            tx_hash: receipt.transaction_hash.to_string(),
        })
    }

    /// Buy MNT with USDC, approving the pool first when the allowance is short.
    #[instrument(skip(self), fields(pool = %self.address))]
    pub async fn swap_usdc_to_mnt(&self, usdc_amount: &str) -> Result<SwapResult> {
        let pool = self.pool();
        let usdc_in: U256 = parse_units(usdc_amount, USDC_DECIMALS)
            .with_context(|| format!("invalid USDC amount: {usdc_amount}"))?
            .get_absolute();

        let usdc = IERC20::new(self.usdc_address().await, self.sender.provider().clone());
        let allowance = usdc.allowance(self.sender.address, self.address).call().await?;
        if allowance < usdc_in {
            let approval = usdc
                .approve(self.address, U256::MAX)
                .send()
                .await?
                .get_receipt()
                .await?;
            info!(tx_hash = %approval.transaction_hash, "Approved USDC for spending");
        }

        let expected = pool.getQuoteUSDCToMNT(usdc_in).call().await.ok();

        let receipt = pool
            .swapUSDCToMNT(usdc_in)
            .send()
            .await?
            .get_receipt()
            .await?;

        if !receipt.status() {
            anyhow::bail!("Transaction reverted: {}", receipt.transaction_hash);
        }

        let from_event = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<ISwapPool::SwapUSDCToMNT>().ok())
            .map(|log| log.inner.data.mntOut)
            .filter(|out| !out.is_zero());

        let mnt_out = match from_event.or(expected) {
            Some(out) => out,
            // No event, no quote: estimate at 2 MNT per USDC
            None => usdc_in * U256::from(2u64) * U256::from(10u64).pow(U256::from(18 - USDC_DECIMALS)),
        };

        info!(
            tx_hash = %receipt.transaction_hash,
            usdc_in = %usdc_amount,
            mnt_out = %mnt_out,
            "Swapped USDC to MNT"
        );

        Ok(SwapResult {
            direction: SwapDirection::UsdcToMnt,
            amount_out: format_ether(mnt_out),
            tx_hash: receipt.transaction_hash.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_usdc_quote() {
        // 1 MNT at $0.50 -> 0.5 USDC = 500_000 units
        let one_mnt = parse_ether("1").unwrap();
        let quote = derive_usdc_quote(U256::from(FALLBACK_PRICE_RAW), one_mnt);
        assert_eq!(quote, U256::from(500_000u64));
        assert_eq!(format_units(quote, USDC_DECIMALS).unwrap(), "0.500000");
    }

    #[test]
    fn test_derive_mnt_per_usdc() {
        // $0.50 per MNT -> 2 MNT per USDC
        let quote = derive_mnt_per_usdc(U256::from(FALLBACK_PRICE_RAW)).unwrap();
        assert_eq!(quote, parse_ether("2").unwrap());
        assert!(derive_mnt_per_usdc(U256::ZERO).is_none());
    }

    #[test]
    fn test_fallback_rates() {
        let rates = ExchangeRates::fallback();
        assert_eq!(rates.usdc_to_mnt_quote, "2.0");
        assert_eq!(rates.fee_percentage, "0");
    }

    #[test]
    fn test_swap_direction_serde() {
        let dir: SwapDirection = serde_json::from_str("\"mnt_to_usdc\"").unwrap();
        assert_eq!(dir, SwapDirection::MntToUsdc);
        assert_eq!(
            serde_json::to_string(&SwapDirection::UsdcToMnt).unwrap(),
            "\"usdc_to_mnt\""
        );
    }

    #[test]
    fn test_default_addresses() {
        assert_eq!(
            DEFAULT_SWAP_POOL.to_string().to_lowercase(),
            "0x0140633989e6ebe5974d7d261f8009c42cd2a40b"
        );
        assert_ne!(DEFAULT_USDC, Address::ZERO);
    }
}
