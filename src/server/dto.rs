use artha_chain::SwapDirection;
use artha_core::TradingSignal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SignalResponse {
    pub success: bool,
    pub signal: TradingSignal,
    pub message: String,
}

impl SignalResponse {
    pub fn new(signal: TradingSignal) -> Self {
        Self {
            success: true,
            message: signal.summary(),
            signal,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub usd: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub direction: SwapDirection,
    /// Decimal amount in the input token
    pub amount: String,
}
