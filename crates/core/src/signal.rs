//! Trading signal parsing and prompt construction.
//!
//! The AI service answers in free text; a signal is recovered by looking for
//! an action word and the first integer in 0..=100.

use std::fmt;
use std::sync::OnceLock;

use artha_api::HolderRecord;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Confidence reported when the reply carries no number.
pub const DEFAULT_CONFIDENCE: u8 = 50;

/// Recommended action on MNT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
            TradeAction::Hold => "hold",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action plus confidence in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub action: TradeAction,
    pub confidence: u8,
}

impl TradingSignal {
    /// Signal reported when none could be obtained.
    pub const NEUTRAL: TradingSignal = TradingSignal {
        action: TradeAction::Hold,
        confidence: DEFAULT_CONFIDENCE,
    };

    /// "Nebula recommends to BUY MNT with 87% confidence"
    pub fn summary(&self) -> String {
        format!(
            "Nebula recommends to {} MNT with {}% confidence",
            self.action.as_str().to_uppercase(),
            self.confidence
        )
    }
}

impl Default for TradingSignal {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn confidence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([0-9]|[1-9][0-9]|100)\b").expect("confidence regex is valid")
    })
}

/// Parse a free-text reply into a signal.
///
/// "buy" wins over "sell"; neither means hold. Matching is case-insensitive.
pub fn parse_trade_signal(text: &str) -> TradingSignal {
    let text = text.to_lowercase();

    let action = if text.contains("buy") {
        TradeAction::Buy
    } else if text.contains("sell") {
        TradeAction::Sell
    } else {
        TradeAction::Hold
    };

    let confidence = confidence_regex()
        .find(&text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_CONFIDENCE);

    TradingSignal { action, confidence }
}

/// Group the integer part with commas, keep at most 3 fraction digits.
pub fn format_thousands(value: f64) -> String {
    let formatted = format!("{:.3}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if value < 0.0 && (int_part != "0" || !frac.is_empty()) {
        "-"
    } else {
        ""
    };

    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

fn holder_line(holder: &HolderRecord) -> String {
    let name = holder
        .name
        .as_deref()
        .map(|n| format!(" - {n}"))
        .unwrap_or_default();
    format!(
        "Address: {} ({}){}\nMNT Balance: {} (${})",
        holder.address,
        holder.kind(),
        name,
        format_thousands(holder.balance),
        format_thousands(holder.usd_value)
    )
}

/// Market analysis prompt over the given top holders.
pub fn market_prompt(holders: &[HolderRecord]) -> String {
    let holders_data = holders
        .iter()
        .map(holder_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze the current market conditions for the native token of Mantle, MNT, on the Mantle Blockchain.

Here are the top {count} MNT holders:
{holders_data}

Based on this data and your knowledge of:
1. Current market trends and technical indicators for MNT
2. Market sentiment and whale wallet behavior
3. Distribution patterns among top holders

Should I BUY, SELL, or HOLD MNT right now to maximize profits?

Provide ONLY A SINGLE WORD answer (BUY, SELL, or HOLD) followed by a confidence score from 0-100, separated by a comma.",
        count = holders.len(),
    )
}

/// Short wallet analysis prompt for Mantle Sepolia.
pub fn portfolio_prompt(address: &str) -> String {
    format!(
        "Analyze the wallet {address} on Mantle Sepolia testnet (chain ID 5003).

Provide a short, concise textual analysis (about 3-4 sentences) of:
1. What tokens this wallet holds
2. The risk profile of this portfolio
3. A recommendation for improvement

Return ONLY the analysis text without any JSON formatting."
    )
}
