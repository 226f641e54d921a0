//! Artha core logic.
//!
//! This crate provides:
//! - Service configuration (TOML + environment)
//! - Trading signal parsing and AI prompts
//! - The trading advisor over holder data and the AI service
//! - Rebalance mode decision and execution
//! - The error taxonomy shared by the service

mod advisor;
pub mod config;
mod error;
mod rebalance;
mod signal;

pub use advisor::{ChatModel, HolderSource, TradingAdvisor, FALLBACK_ANALYSIS};
pub use config::ArthaConfig;
pub use error::{ArthaError, ArthaResult};
pub use rebalance::{
    RebalanceExecutor, RebalanceMode, RebalanceOutcome, Rebalancer, SignalSource,
};
pub use signal::{
    format_thousands, market_prompt, parse_trade_signal, portfolio_prompt, TradeAction,
    TradingSignal, DEFAULT_CONFIDENCE,
};
