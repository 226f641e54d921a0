//! Trading advisor: holders in, AI signal and wallet analysis out.

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;
use artha_api::{ExplorerClient, HolderRecord, HolderSnapshot, NebulaClient};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::error::{ArthaError, ArthaResult};
use crate::signal::{market_prompt, parse_trade_signal, portfolio_prompt, TradingSignal};

/// Analysis served when the AI service cannot answer.
pub const FALLBACK_ANALYSIS: &str = "This wallet on Mantle Sepolia testnet contains mostly MNT with some USDC and minimal ETH. The portfolio has a high risk profile due to concentration in volatile assets. Consider rebalancing to include more stablecoins for better risk management.";

/// Source of ranked token holders.
#[async_trait]
pub trait HolderSource: Send + Sync + Debug {
    async fn top_holders(&self) -> Result<Vec<HolderRecord>>;
}

/// Free-text chat completion.
#[async_trait]
pub trait ChatModel: Send + Sync + Debug {
    async fn chat(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl HolderSource for ExplorerClient {
    async fn top_holders(&self) -> Result<Vec<HolderRecord>> {
        self.fetch_top_holders().await
    }
}

#[async_trait]
impl ChatModel for NebulaClient {
    async fn chat(&self, prompt: &str) -> Result<String> {
        NebulaClient::chat(self, prompt).await
    }
}

/// Combines holder data with the AI service.
#[derive(Debug, Clone)]
pub struct TradingAdvisor {
    holders: Arc<dyn HolderSource>,
    model: Arc<dyn ChatModel>,
}

impl TradingAdvisor {
    pub fn new(holders: Arc<dyn HolderSource>, model: Arc<dyn ChatModel>) -> Self {
        Self { holders, model }
    }

    /// Live holders, or the known list when the source fails.
    #[instrument(skip(self))]
    pub async fn holders(&self) -> HolderSnapshot {
        match self.holders.top_holders().await {
            Ok(holders) => HolderSnapshot::live(holders),
            Err(e) => {
                warn!(error = %e, "Error fetching top MNT holders, using fallback list");
                HolderSnapshot::fallback()
            }
        }
    }

    /// Ask the AI service for a signal over the current top holders.
    ///
    /// A failed holder lookup falls back to the known list; a failed chat
    /// call is an error.
    #[instrument(skip(self))]
    pub async fn trade_signal(&self) -> ArthaResult<TradingSignal> {
        let snapshot = self.holders().await;
        let prompt = market_prompt(&snapshot.holders);

        let reply = self
            .model
            .chat(&prompt)
            .await
            .map_err(|e| ArthaError::Ai(e.to_string()))?;

        let signal = parse_trade_signal(&reply);
        info!(
            action = %signal.action,
            confidence = signal.confidence,
            holders = ?snapshot.source,
            "Trade signal"
        );

        Ok(signal)
    }

    /// [`Self::trade_signal`], or hold at 50 on error.
    pub async fn signal_or_default(&self) -> TradingSignal {
        match self.trade_signal().await {
            Ok(signal) => signal,
            Err(e) => {
                warn!(error = %e, "Error getting trade signal, reporting neutral");
                TradingSignal::NEUTRAL
            }
        }
    }

    /// Short analysis of a wallet on Mantle Sepolia.
    #[instrument(skip(self))]
    pub async fn portfolio_analysis(&self, address: &str) -> String {
        match self.model.chat(&portfolio_prompt(address)).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    FALLBACK_ANALYSIS.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                warn!(error = %e, "Error getting portfolio analysis, using fallback");
                FALLBACK_ANALYSIS.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artha_api::{fallback_holders, HolderOrigin};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct StubHolders(Option<Vec<HolderRecord>>);

    #[async_trait]
    impl HolderSource for StubHolders {
        async fn top_holders(&self) -> Result<Vec<HolderRecord>> {
            self.0.clone().ok_or_else(|| anyhow::anyhow!("explorer down"))
        }
    }

    /// Replies with a fixed text, or fails; records the prompts it saw.
    #[derive(Debug, Default)]
    struct StubModel {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                prompts: Mutex::default(),
            }
        }

        fn failing() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl ChatModel for StubModel {
        async fn chat(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().ok_or_else(|| anyhow::anyhow!("nebula down"))
        }
    }

    fn build(holders: Option<Vec<HolderRecord>>, model: StubModel) -> (TradingAdvisor, Arc<StubModel>) {
        let model = Arc::new(model);
        let advisor = TradingAdvisor::new(Arc::new(StubHolders(holders)), model.clone());
        (advisor, model)
    }

    #[tokio::test]
    async fn test_holders_fallback_on_error() {
        let (advisor, _) = build(None, StubModel::failing());
        let snapshot = advisor.holders().await;
        assert_eq!(snapshot.source, HolderOrigin::Fallback);
        assert_eq!(snapshot.holders.len(), 10);
    }

    #[tokio::test]
    async fn test_holders_live() {
        let live = fallback_holders().into_iter().take(3).collect();
        let (advisor, _) = build(Some(live), StubModel::failing());
        let snapshot = advisor.holders().await;
        assert_eq!(snapshot.source, HolderOrigin::Live);
        assert_eq!(snapshot.holders.len(), 3);
    }

    #[tokio::test]
    async fn test_trade_signal_parses_reply() {
        let (advisor, model) = build(None, StubModel::replying("BUY, 87"));
        let signal = advisor.trade_signal().await.unwrap();
        assert_eq!(signal.action, crate::signal::TradeAction::Buy);
        assert_eq!(signal.confidence, 87);

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("top 10 MNT holders"));
    }

    #[tokio::test]
    async fn test_trade_signal_error_and_default() {
        let (advisor, _) = build(None, StubModel::failing());
        let err = advisor.trade_signal().await.unwrap_err();
        assert!(matches!(err, ArthaError::Ai(_)));
        assert_eq!(advisor.signal_or_default().await, TradingSignal::NEUTRAL);
    }

    #[tokio::test]
    async fn test_portfolio_analysis() {
        let (advisor, _) = build(None, StubModel::replying("  Mostly MNT.  \n"));
        assert_eq!(advisor.portfolio_analysis("0xabc").await, "Mostly MNT.");

        let (advisor, _) = build(None, StubModel::failing());
        assert_eq!(advisor.portfolio_analysis("0xabc").await, FALLBACK_ANALYSIS);
    }
}
