//! Artha DeFi dashboard backend
//!
//! Serves Mantle holder data, AI trading signals and wallet analysis, and
//! turns the trading signal into a vault `rebalance` call on request.
//! Features:
//! - Top WMNT holders from the Mantle Explorer with a known-holder fallback
//! - Nebula buy/sell/hold signal with time-of-day fallback for rebalancing
//! - Bearer-protected rebalance and swap endpoints for cron jobs

mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use artha_api::{ExplorerClient, NebulaClient, PriceClient};
use artha_chain::{read_provider, InvestmentContract, SwapPool, TransactionSender};
use artha_core::{ArthaConfig, Rebalancer, TradingAdvisor};

use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,artha_core=debug,artha_chain=debug,tower_http=debug")
            }),
        )
        .init();

    // ARTHA_CONFIG names an optional TOML file; env vars override it
    let config = ArthaConfig::from_env().context("Failed to load configuration")?;
    config.log_config();

    info!("Starting Artha");
    info!(chain_id = config.chain.chain_id, "Chain: Mantle Sepolia");

    let state = build_state(&config)?;
    let app = server::app(state);

    let addr: SocketAddr = config
        .server
        .bind_addr()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.bind_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire clients, signer and contracts from configuration.
fn build_state(config: &ArthaConfig) -> Result<AppState> {
    let explorer = ExplorerClient::with_base_url(config.explorer.base_url.clone())
        .with_token(config.explorer.token_address.clone())
        .with_limit(config.explorer.holder_limit);
    let nebula = NebulaClient::with_base_url(
        config.nebula.base_url.clone(),
        config.nebula.secret_key.clone(),
    );
    if !nebula.is_configured() {
        warn!("THIRDWEB_SECRET_KEY not set, trading signals will fall back");
    }

    let advisor = Arc::new(TradingAdvisor::new(Arc::new(explorer), Arc::new(nebula)));

    let sender = match config.chain.deployer_private_key.as_deref() {
        Some(key) => Some(Arc::new(TransactionSender::new(
            key,
            &config.chain.rpc_url,
            config.chain.chain_id,
        )?)),
        None => None,
    };

    let investment = match (config.chain.investment_address()?, &sender) {
        (Some(address), Some(sender)) => {
            Some(Arc::new(InvestmentContract::with_sender(address, sender.clone())))
        }
        (Some(address), None) => Some(Arc::new(InvestmentContract::new(
            address,
            read_provider(&config.chain.rpc_url)?,
        ))),
        (None, _) => None,
    };

    let rebalancer = match investment.as_ref().filter(|c| c.can_send()) {
        Some(contract) => Rebalancer::new(advisor.clone(), contract.clone()),
        None => {
            let reason = match config.missing_signer_setting() {
                Some("DEPLOYER_PRIVATE_KEY") => {
                    "Deployer private key not configured in environment variables (DEPLOYER_PRIVATE_KEY)."
                }
                _ => "Investment contract address not configured in environment variables (INVESTMENT_CONTRACT_ADDRESS).",
            };
            warn!(reason = reason, "Rebalancing disabled");
            Rebalancer::unconfigured(advisor.clone(), reason)
        }
    };

    let swap = match &sender {
        Some(sender) => Some(Arc::new(SwapPool::new(
            config.chain.swap_address()?,
            config.chain.usdc_address()?,
            sender.clone(),
        ))),
        None => None,
    };

    Ok(AppState {
        advisor,
        rebalancer: Arc::new(rebalancer),
        prices: Arc::new(PriceClient::with_base_url(config.price.base_url.clone())),
        investment,
        swap,
        cron_secret: config.auth.cron_secret.clone(),
    })
}
