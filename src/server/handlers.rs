use std::time::Instant;

use alloy::primitives::Address;
use artha_api::HolderSnapshot;
use artha_chain::{ExchangeRates, InvestmentPosition, PoolBalances, PoolInfo, SwapResult};
use artha_core::RebalanceOutcome;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::*;
use super::error::{AppError, AppResult};
use super::AppState;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Liveness of the rebalance endpoint, behind the same bearer check.
pub async fn rebalance_status() -> Json<StatusMessage> {
    Json(StatusMessage {
        success: true,
        message: "Rebalance API is running".to_string(),
    })
}

/// Decide a mode from the current signal and submit it to the vault.
pub async fn rebalance(State(state): State<AppState>) -> (StatusCode, Json<RebalanceOutcome>) {
    let start = Instant::now();
    tracing::info!("Processing rebalance request");

    let outcome = state.rebalancer.run().await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    tracing::info!(
        success = outcome.success,
        tx_hash = outcome.tx_hash.as_deref().unwrap_or("-"),
        duration_ms = %start.elapsed().as_millis(),
        "Rebalance request completed"
    );

    (status, Json(outcome))
}

pub async fn test_signal(State(state): State<AppState>) -> AppResult<Json<SignalResponse>> {
    let signal = state
        .advisor
        .trade_signal()
        .await
        .map_err(|e| AppError::Signal(e.to_string()))?;

    Ok(Json(SignalResponse::new(signal)))
}

/// Dashboard signal; hold at 50 when the AI service is unavailable.
pub async fn signal(State(state): State<AppState>) -> Json<SignalResponse> {
    Json(SignalResponse::new(state.advisor.signal_or_default().await))
}

pub async fn holders(State(state): State<AppState>) -> Json<HolderSnapshot> {
    Json(state.advisor.holders().await)
}

pub async fn mnt_price(State(state): State<AppState>) -> Json<PriceResponse> {
    Json(PriceResponse {
        usd: state.prices.mnt_usd_or_fallback().await,
    })
}

fn parse_wallet(address: &str) -> AppResult<Address> {
    address
        .parse()
        .map_err(|_| AppError::InvalidParam(format!("invalid wallet address: {address}")))
}

pub async fn portfolio_analysis(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Json<AnalysisResponse>> {
    parse_wallet(&address)?;
    tracing::info!(wallet = %address, "Generating portfolio analysis");

    Ok(Json(AnalysisResponse {
        analysis: state.advisor.portfolio_analysis(&address).await,
    }))
}

pub async fn investment_info(State(state): State<AppState>) -> AppResult<Json<PoolInfo>> {
    let contract = state
        .investment
        .as_ref()
        .ok_or(AppError::NotConfigured("Investment contract"))?;

    let info = contract
        .pool_info()
        .await
        .map_err(|e| AppError::Chain(e.to_string()))?;
    Ok(Json(info))
}

pub async fn investment_position(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<Json<InvestmentPosition>> {
    let user = parse_wallet(&address)?;
    let contract = state
        .investment
        .as_ref()
        .ok_or(AppError::NotConfigured("Investment contract"))?;

    let position = contract
        .user_position(user)
        .await
        .map_err(|e| AppError::Chain(e.to_string()))?;
    Ok(Json(position))
}

pub async fn swap_rates(State(state): State<AppState>) -> AppResult<Json<ExchangeRates>> {
    let pool = state
        .swap
        .as_ref()
        .ok_or(AppError::NotConfigured("Swap pool"))?;
    Ok(Json(pool.exchange_rates().await))
}

pub async fn swap_balances(State(state): State<AppState>) -> AppResult<Json<PoolBalances>> {
    let pool = state
        .swap
        .as_ref()
        .ok_or(AppError::NotConfigured("Swap pool"))?;
    Ok(Json(pool.balances().await))
}

pub async fn swap(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> AppResult<Json<SwapResult>> {
    let amount = request.amount.trim();
    match amount.parse::<f64>() {
        Ok(value) if value > 0.0 => {}
        _ => return Err(AppError::InvalidParam(format!("amount must be positive: {amount}"))),
    }

    let pool = state
        .swap
        .as_ref()
        .ok_or(AppError::NotConfigured("Swap pool"))?;

    tracing::info!(direction = ?request.direction, amount = %amount, "Processing swap request");

    let result = pool
        .swap(request.direction, amount)
        .await
        .map_err(|e| AppError::Chain(e.to_string()))?;
    Ok(Json(result))
}
