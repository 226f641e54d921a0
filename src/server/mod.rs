//! HTTP surface of the Artha service.

mod auth;
pub mod dto;
mod error;
pub mod handlers;

use std::sync::Arc;

use artha_api::PriceClient;
use artha_chain::{InvestmentContract, SwapPool};
use artha_core::{Rebalancer, TradingAdvisor};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{AppError, AppResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<TradingAdvisor>,
    pub rebalancer: Arc<Rebalancer>,
    pub prices: Arc<PriceClient>,
    /// Vault read views, when an address is configured
    pub investment: Option<Arc<InvestmentContract>>,
    /// Swap pool, when a signer is configured
    pub swap: Option<Arc<SwapPool>>,
    pub cron_secret: Option<String>,
}

pub fn create_router(state: AppState) -> Router<AppState> {
    // Bearer-protected routes
    let cron = Router::new()
        .route(
            "/api/rebalance",
            get(handlers::rebalance_status).post(handlers::rebalance),
        )
        .route("/api/swap", post(handlers::swap))
        .route_layer(middleware::from_fn_with_state(state, auth::cron_auth));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/test-signal", get(handlers::test_signal))
        // Dashboard data
        .route("/api/signal", get(handlers::signal))
        .route("/api/holders", get(handlers::holders))
        .route("/api/price/mnt", get(handlers::mnt_price))
        .route(
            "/api/portfolio/{address}/analysis",
            get(handlers::portfolio_analysis),
        )
        .route("/api/investment", get(handlers::investment_info))
        .route("/api/investment/{address}", get(handlers::investment_position))
        // Swap pool
        .route("/api/swap/rates", get(handlers::swap_rates))
        .route("/api/swap/balances", get(handlers::swap_balances))
        .merge(cron)
}

/// Router with CORS and request tracing applied.
pub fn app(state: AppState) -> Router {
    create_router(state.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use alloy::primitives::B256;
    use artha_api::{fallback_holders, HolderRecord};
    use artha_chain::{RebalanceReceipt, TransactionSender, DEFAULT_SWAP_POOL, DEFAULT_USDC};
    use artha_core::{ChatModel, HolderSource, RebalanceExecutor, RebalanceMode};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    const SECRET: &str = "cron-s3cret";

    #[derive(Debug)]
    struct StubHolders;

    #[async_trait]
    impl HolderSource for StubHolders {
        async fn top_holders(&self) -> anyhow::Result<Vec<HolderRecord>> {
            Ok(fallback_holders())
        }
    }

    #[derive(Debug)]
    struct StubModel(Option<&'static str>);

    #[async_trait]
    impl ChatModel for StubModel {
        async fn chat(&self, _prompt: &str) -> anyhow::Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("Nebula returned 503: unavailable"))
        }
    }

    #[derive(Debug, Default)]
    struct CountingExecutor {
        calls: AtomicUsize,
        last_mode: std::sync::Mutex<Option<RebalanceMode>>,
    }

    #[async_trait]
    impl RebalanceExecutor for CountingExecutor {
        async fn rebalance(&self, mode: RebalanceMode) -> anyhow::Result<RebalanceReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_mode.lock().unwrap() = Some(mode);
            Ok(RebalanceReceipt {
                tx_hash: B256::repeat_byte(0x11),
                block_number: Some(42),
                gas_used: 50_000,
                action: Some("buy".to_string()),
                amount: None,
            })
        }
    }

    fn test_state(reply: Option<&'static str>, secret: Option<&str>) -> (AppState, Arc<CountingExecutor>) {
        let advisor = Arc::new(TradingAdvisor::new(
            Arc::new(StubHolders),
            Arc::new(StubModel(reply)),
        ));
        let executor = Arc::new(CountingExecutor::default());
        let rebalancer = Rebalancer::new(advisor.clone(), executor.clone()).with_clock(|| 20);

        let state = AppState {
            advisor,
            rebalancer: Arc::new(rebalancer),
            prices: Arc::new(PriceClient::with_base_url("http://127.0.0.1:9")),
            investment: None,
            swap: None,
            cron_secret: secret.map(str::to_string),
        };
        (state, executor)
    }

    fn request(method: &str, uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(state: AppState, req: Request<Body>) -> (StatusCode, Value) {
        let response = app(state).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = test_state(None, None);
        let (status, body) = send(state, request("GET", "/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_rebalance_rejects_bad_token_without_executing() {
        let (state, executor) = test_state(Some("BUY, 87"), Some(SECRET));
        let (status, body) = send(state, request("POST", "/api/rebalance", Some("wrong"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "message": "Unauthorized access" })
        );
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rebalance_rejects_when_secret_unset() {
        let (state, executor) = test_state(Some("BUY, 87"), None);
        let (status, _) = send(state, request("POST", "/api/rebalance", Some(""))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rebalance_status() {
        let (state, _) = test_state(None, Some(SECRET));
        let (status, body) = send(state.clone(), request("GET", "/api/rebalance", Some(SECRET))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Rebalance API is running");

        let (status, _) = send(state, request("GET", "/api/rebalance", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rebalance_follows_signal() {
        let (state, executor) = test_state(Some("BUY, 87"), Some(SECRET));
        let (status, body) = send(state, request("POST", "/api/rebalance", Some(SECRET))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Successfully rebalanced investment with mode: 1");
        assert_eq!(body["txHash"], B256::repeat_byte(0x11).to_string());
        assert_eq!(*executor.last_mode.lock().unwrap(), Some(RebalanceMode::Buy));
    }

    #[tokio::test]
    async fn test_rebalance_falls_back_to_hour() {
        // Clock is pinned to 20:00
        let (state, executor) = test_state(None, Some(SECRET));
        let (status, body) = send(state, request("POST", "/api/rebalance", Some(SECRET))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Successfully rebalanced investment with mode: 2");
        assert_eq!(*executor.last_mode.lock().unwrap(), Some(RebalanceMode::Sell));
    }

    #[tokio::test]
    async fn test_rebalance_unconfigured_is_500() {
        let (mut state, _) = test_state(Some("SELL, 60"), Some(SECRET));
        state.rebalancer = Arc::new(Rebalancer::unconfigured(
            state.advisor.clone(),
            "Deployer private key not configured in environment variables (DEPLOYER_PRIVATE_KEY).",
        ));
        let (status, body) = send(state, request("POST", "/api/rebalance", Some(SECRET))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("DEPLOYER_PRIVATE_KEY"));
        assert!(body.get("txHash").is_none());
    }

    #[tokio::test]
    async fn test_signal_endpoint() {
        let (state, _) = test_state(Some("BUY, 87"), None);
        let (status, body) = send(state, request("GET", "/api/test-signal", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["signal"], serde_json::json!({ "action": "buy", "confidence": 87 }));
        assert_eq!(body["message"], "Nebula recommends to BUY MNT with 87% confidence");
    }

    #[tokio::test]
    async fn test_signal_endpoint_error() {
        let (state, _) = test_state(None, None);
        let (status, body) = send(state, request("GET", "/api/test-signal", None)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_dashboard_signal_defaults_to_hold() {
        let (state, _) = test_state(None, None);
        let (status, body) = send(state, request("GET", "/api/signal", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["signal"], serde_json::json!({ "action": "hold", "confidence": 50 }));
    }

    #[tokio::test]
    async fn test_dashboard_signal_live() {
        let (state, _) = test_state(Some("Sell now, confidence 72"), None);
        let (status, body) = send(state, request("GET", "/api/signal", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["signal"], serde_json::json!({ "action": "sell", "confidence": 72 }));
    }

    #[tokio::test]
    async fn test_holders_endpoint() {
        let (state, _) = test_state(None, None);
        let (status, body) = send(state, request("GET", "/api/holders", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "live");
        assert_eq!(body["holders"].as_array().unwrap().len(), 10);
        assert_eq!(body["holders"][0]["rank"], 1);
    }

    #[tokio::test]
    async fn test_portfolio_analysis_validates_address() {
        let (state, _) = test_state(Some("Mostly MNT."), None);
        let (status, _) = send(state.clone(), request("GET", "/api/portfolio/nope/analysis", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = "/api/portfolio/0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266/analysis";
        let (status, body) = send(state, request("GET", uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analysis"], "Mostly MNT.");
    }

    #[tokio::test]
    async fn test_chain_routes_unconfigured() {
        let (state, _) = test_state(None, Some(SECRET));

        let (status, body) = send(state.clone(), request("GET", "/api/swap/rates", None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "NOT_CONFIGURED");

        let (status, _) = send(state.clone(), request("GET", "/api/swap/balances", None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = send(state, request("GET", "/api/investment", None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_swap_balances_zero_when_chain_unreachable() {
        let (mut state, _) = test_state(None, Some(SECRET));
        // Anvil account #0, nothing listens on the discard port
        let sender = TransactionSender::new(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "http://127.0.0.1:9",
            5003,
        )
        .unwrap();
        state.swap = Some(Arc::new(SwapPool::new(
            DEFAULT_SWAP_POOL,
            DEFAULT_USDC,
            Arc::new(sender),
        )));

        let (status, body) = send(state, request("GET", "/api/swap/balances", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "mntBalance": "0",
                "usdcBalance": "0",
                "contractMntBalance": "0",
                "contractUsdcBalance": "0"
            })
        );
    }

    #[tokio::test]
    async fn test_swap_requires_auth() {
        let (state, _) = test_state(None, Some(SECRET));
        let req = Request::builder()
            .method("POST")
            .uri("/api/swap")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"direction":"mnt_to_usdc","amount":"1.5"}"#))
            .unwrap();
        let (status, _) = send(state, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_swap_auth_checked_before_body() {
        let (state, _) = test_state(None, Some(SECRET));

        let malformed = Request::builder()
            .method("POST")
            .uri("/api/swap")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(state.clone(), malformed).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized access");

        let untyped = Request::builder()
            .method("POST")
            .uri("/api/swap")
            .header("authorization", "Bearer wrong")
            .body(Body::from("amount=1"))
            .unwrap();
        let (status, _) = send(state, untyped).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_swap_rejects_bad_amount() {
        let (state, _) = test_state(None, Some(SECRET));
        let req = Request::builder()
            .method("POST")
            .uri("/api/swap")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {SECRET}"))
            .body(Body::from(r#"{"direction":"usdc_to_mnt","amount":"-2"}"#))
            .unwrap();
        let (status, body) = send(state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAM");
    }
}
