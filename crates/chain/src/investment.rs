//! Investment vault wrapper: signed `rebalance` calls and read-only views.

use std::sync::Arc;
use std::time::Instant;

use alloy::network::ReceiptResponse;
use alloy::primitives::{utils::format_ether, Address, B256, U256};
use alloy::providers::DynProvider;
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::bindings::IInvestment;
use crate::signer::TransactionSender;

/// Outcome of a confirmed `rebalance` transaction.
#[derive(Debug, Clone)]
pub struct RebalanceReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Action reported by the `Rebalanced` event, when emitted
    pub action: Option<String>,
    /// Amount reported by the `Rebalanced` event, when emitted
    pub amount: Option<U256>,
}

/// A user's position in the vault, formatted in MNT.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPosition {
    pub user: Address,
    pub deposited_mnt: String,
    pub current_value_mnt: String,
    pub total_pool_value_mnt: String,
    pub shares: String,
}

/// Vault-wide parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    pub address: Address,
    pub owner: Address,
    pub swapper: Address,
    pub usdc: Address,
    pub total_shares: String,
    /// Withdraw fee in basis of `fee_denominator`
    pub withdraw_fee: String,
    pub fee_denominator: String,
}

/// Investment vault contract wrapper.
#[derive(Debug, Clone)]
pub struct InvestmentContract {
    /// Contract address
    pub address: Address,
    /// Provider for view calls
    reader: DynProvider,
    /// Transaction sender (absent for read-only use)
    sender: Option<Arc<TransactionSender>>,
}

impl InvestmentContract {
    /// Read-only wrapper.
    pub fn new(address: Address, reader: DynProvider) -> Self {
        Self {
            address,
            reader,
            sender: None,
        }
    }

    /// Wrapper that can also send transactions.
    pub fn with_sender(address: Address, sender: Arc<TransactionSender>) -> Self {
        Self {
            address,
            reader: sender.provider().clone(),
            sender: Some(sender),
        }
    }

    /// Whether a signer is attached.
    pub fn can_send(&self) -> bool {
        self.sender.is_some()
    }

    fn signer(&self) -> Result<&Arc<TransactionSender>> {
        self.sender
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no transaction sender configured"))
    }

    /// Call `rebalance(mode)` and wait for the receipt.
    #[instrument(skip(self), fields(contract = %self.address))]
    pub async fn rebalance(&self, mode: u8) -> Result<RebalanceReceipt> {
        let sender = self.signer()?;
        let start = Instant::now();

        info!(mode = mode, from = %sender.address, "Calling rebalance");

        let contract = IInvestment::new(self.address, sender.provider().clone());
        let pending = contract.rebalance(mode).send().await?;
        let tx_hash = *pending.tx_hash();

        debug!(tx_hash = %tx_hash, "Rebalance submitted, waiting for confirmation");

        let receipt = pending.get_receipt().await?;

        if !receipt.status() {
            warn!(tx_hash = %tx_hash, "Rebalance transaction reverted");
            anyhow::bail!("Transaction reverted: {tx_hash}");
        }

        let event = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<IInvestment::Rebalanced>().ok())
            .map(|log| log.inner.data);

        info!(
            tx_hash = %tx_hash,
            block = receipt.block_number.unwrap_or(0),
            gas_used = receipt.gas_used,
            action = event.as_ref().map(|e| e.action.as_str()).unwrap_or("-"),
            elapsed_ms = start.elapsed().as_millis(),
            "Rebalance confirmed"
        );

        Ok(RebalanceReceipt {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            action: event.as_ref().map(|e| e.action.clone()),
            amount: event.map(|e| e.amount),
        })
    }

    /// A user's deposit, current value and share count.
    #[instrument(skip(self), fields(contract = %self.address))]
    pub async fn user_position(&self, user: Address) -> Result<InvestmentPosition> {
        let contract = IInvestment::new(self.address, self.reader.clone());

        let info = contract.getUserInvestmentInfo(user).call().await?;
        let shares = contract.userShares(user).call().await?;

        Ok(InvestmentPosition {
            user,
            deposited_mnt: format_ether(info.userDepositMNT),
            current_value_mnt: format_ether(info.userCurrentValue),
            total_pool_value_mnt: format_ether(info.totalPoolValue),
            shares: shares.to_string(),
        })
    }

    /// Owner, swapper, USDC token, share supply and fee parameters.
    #[instrument(skip(self), fields(contract = %self.address))]
    pub async fn pool_info(&self) -> Result<PoolInfo> {
        let contract = IInvestment::new(self.address, self.reader.clone());

        let owner = contract.owner().call().await?;
        let swapper = contract.swapper().call().await?;
        let usdc = contract.usdc().call().await?;
        let total_shares = contract.totalShares().call().await?;
        let withdraw_fee = contract.WITHDRAW_FEE().call().await?;
        let fee_denominator = contract.FEE_DENOMINATOR().call().await?;

        Ok(PoolInfo {
            address: self.address,
            owner,
            swapper,
            usdc,
            total_shares: total_shares.to_string(),
            withdraw_fee: withdraw_fee.to_string(),
            fee_denominator: fee_denominator.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{read_provider, MANTLE_SEPOLIA_CHAIN_ID, MANTLE_SEPOLIA_RPC};

    #[tokio::test]
    async fn test_read_only_cannot_rebalance() {
        let reader = read_provider(MANTLE_SEPOLIA_RPC).unwrap();
        let contract = InvestmentContract::new(Address::ZERO, reader);
        assert!(!contract.can_send());

        let err = contract.rebalance(1).await.unwrap_err();
        assert!(err.to_string().contains("no transaction sender"));
    }

    #[tokio::test]
    async fn test_with_sender_can_send() {
        let sender = TransactionSender::new(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            MANTLE_SEPOLIA_RPC,
            MANTLE_SEPOLIA_CHAIN_ID,
        )
        .unwrap();
        let contract = InvestmentContract::with_sender(Address::ZERO, Arc::new(sender));
        assert!(contract.can_send());
    }

    #[test]
    fn test_position_serializes_camel_case() {
        let position = InvestmentPosition {
            user: Address::ZERO,
            deposited_mnt: format_ether(U256::from(1_500_000_000_000_000_000u128)),
            current_value_mnt: "0.000000000000000000".to_string(),
            total_pool_value_mnt: "0.000000000000000000".to_string(),
            shares: "0".to_string(),
        };
        let json = serde_json::to_value(&position).unwrap();
        assert_eq!(json["depositedMnt"], "1.500000000000000000");
        assert!(json.get("totalPoolValueMnt").is_some());
    }
}
