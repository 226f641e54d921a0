//! Rebalance decision and execution.
//!
//! The AI signal picks the vault mode; when no signal is available the mode
//! follows the local time of day.

use std::fmt::{self, Debug};
use std::sync::Arc;

use anyhow::Result;
use artha_chain::{InvestmentContract, RebalanceReceipt};
use async_trait::async_trait;
use chrono::Timelike;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::advisor::TradingAdvisor;
use crate::error::{ArthaError, ArthaResult};
use crate::signal::{TradeAction, TradingSignal};

/// Argument of the vault's `rebalance(uint8)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum RebalanceMode {
    Hold = 0,
    Buy = 1,
    Sell = 2,
}

impl RebalanceMode {
    pub fn from_action(action: TradeAction) -> Self {
        match action {
            TradeAction::Buy => RebalanceMode::Buy,
            TradeAction::Sell => RebalanceMode::Sell,
            TradeAction::Hold => RebalanceMode::Hold,
        }
    }

    /// Schedule used without a signal: hold before 08:00, buy until 16:00,
    /// sell afterwards.
    pub fn for_hour(hour: u32) -> Self {
        if hour < 8 {
            RebalanceMode::Hold
        } else if hour < 16 {
            RebalanceMode::Buy
        } else {
            RebalanceMode::Sell
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<RebalanceMode> for u8 {
    fn from(mode: RebalanceMode) -> u8 {
        mode.as_u8()
    }
}

impl TryFrom<u8> for RebalanceMode {
    type Error = ArthaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RebalanceMode::Hold),
            1 => Ok(RebalanceMode::Buy),
            2 => Ok(RebalanceMode::Sell),
            other => Err(ArthaError::InvalidMode(other)),
        }
    }
}

impl fmt::Display for RebalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Provider of trading signals.
#[async_trait]
pub trait SignalSource: Send + Sync + Debug {
    async fn trade_signal(&self) -> ArthaResult<TradingSignal>;
}

#[async_trait]
impl SignalSource for TradingAdvisor {
    async fn trade_signal(&self) -> ArthaResult<TradingSignal> {
        TradingAdvisor::trade_signal(self).await
    }
}

/// Submits the vault's `rebalance` transaction.
#[async_trait]
pub trait RebalanceExecutor: Send + Sync + Debug {
    async fn rebalance(&self, mode: RebalanceMode) -> Result<RebalanceReceipt>;
}

#[async_trait]
impl RebalanceExecutor for InvestmentContract {
    async fn rebalance(&self, mode: RebalanceMode) -> Result<RebalanceReceipt> {
        InvestmentContract::rebalance(self, mode.as_u8()).await
    }
}

/// Result reported to the caller of a rebalance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebalanceOutcome {
    pub success: bool,
    pub message: String,
    #[serde(rename = "txHash", skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl RebalanceOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            tx_hash: None,
        }
    }
}

/// Local wall-clock hour.
fn local_hour() -> u32 {
    chrono::Local::now().hour()
}

/// Decides a mode and submits it.
#[derive(Debug, Clone)]
pub struct Rebalancer {
    signals: Arc<dyn SignalSource>,
    /// Executor, or why there is none
    executor: Result<Arc<dyn RebalanceExecutor>, String>,
    clock: fn() -> u32,
}

impl Rebalancer {
    pub fn new(signals: Arc<dyn SignalSource>, executor: Arc<dyn RebalanceExecutor>) -> Self {
        Self {
            signals,
            executor: Ok(executor),
            clock: local_hour,
        }
    }

    /// A rebalancer that reports `reason` instead of sending.
    pub fn unconfigured(signals: Arc<dyn SignalSource>, reason: impl Into<String>) -> Self {
        Self {
            signals,
            executor: Err(reason.into()),
            clock: local_hour,
        }
    }

    /// Replace the hour source used by the time-of-day fallback.
    pub fn with_clock(mut self, clock: fn() -> u32) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.executor.is_ok()
    }

    /// Mode for the current signal, or the time-of-day mode when the signal fails.
    #[instrument(skip(self))]
    pub async fn decide_mode(&self) -> RebalanceMode {
        match self.signals.trade_signal().await {
            Ok(signal) => {
                info!(
                    action = %signal.action,
                    confidence = signal.confidence,
                    "Nebula trade signal"
                );
                RebalanceMode::from_action(signal.action)
            }
            Err(e) => {
                let hour = (self.clock)();
                let mode = RebalanceMode::for_hour(hour);
                warn!(error = %e, hour = hour, mode = %mode, "Error determining rebalance mode, using time of day");
                mode
            }
        }
    }

    /// Submit `mode` to the vault.
    #[instrument(skip(self))]
    pub async fn execute(&self, mode: RebalanceMode) -> RebalanceOutcome {
        let executor = match &self.executor {
            Ok(executor) => executor,
            Err(reason) => {
                warn!(reason = %reason, "Rebalance executor not configured");
                return RebalanceOutcome::failure(reason.clone());
            }
        };

        match executor.rebalance(mode).await {
            Ok(receipt) => {
                info!(mode = %mode, tx_hash = %receipt.tx_hash, "Rebalanced investment");
                RebalanceOutcome {
                    success: true,
                    message: format!("Successfully rebalanced investment with mode: {mode}"),
                    tx_hash: Some(receipt.tx_hash.to_string()),
                }
            }
            Err(e) => {
                error!(mode = %mode, error = %e, "Error rebalancing investment");
                RebalanceOutcome::failure(format!("Error rebalancing investment: {e}"))
            }
        }
    }

    /// Decide and submit. Nothing is asked of the signal source when no
    /// executor is configured.
    pub async fn run(&self) -> RebalanceOutcome {
        if let Err(reason) = &self.executor {
            warn!(reason = %reason, "Rebalance executor not configured");
            return RebalanceOutcome::failure(reason.clone());
        }
        let mode = self.decide_mode().await;
        self.execute(mode).await
    }
}
