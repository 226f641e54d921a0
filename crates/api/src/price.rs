//! CoinGecko spot price lookup for MNT.

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{instrument, warn};

/// Default CoinGecko API endpoint.
pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";

/// Price served when CoinGecko is unavailable.
pub const FALLBACK_MNT_USD: f64 = 0.45;

/// CoinGecko coin id for Mantle.
const MANTLE_ID: &str = "mantle";

/// CoinGecko simple price client.
#[derive(Debug, Clone)]
pub struct PriceClient {
    client: reqwest::Client,
    base_url: String,
}

/// `{"mantle": {"usd": 0.61}}`
#[derive(Debug, Deserialize)]
struct SimplePriceResponse(HashMap<String, CoinPrice>);

#[derive(Debug, Deserialize)]
struct CoinPrice {
    usd: Option<f64>,
}

impl PriceClient {
    /// Create a new CoinGecko client.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_COINGECKO_URL)
    }

    /// Create a client with custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Current MNT/USD price.
    #[instrument(skip(self))]
    pub async fn mnt_usd(&self) -> Result<f64> {
        let url = format!("{}/simple/price", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("ids", MANTLE_ID), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?;

        let data: SimplePriceResponse = response.json().await?;
        extract_usd(&data)
    }

    /// Current MNT/USD price, or [`FALLBACK_MNT_USD`] on any failure.
    pub async fn mnt_usd_or_fallback(&self) -> f64 {
        match self.mnt_usd().await {
            Ok(price) => price,
            Err(e) => {
                warn!(error = %e, fallback = FALLBACK_MNT_USD, "Error fetching MNT price");
                FALLBACK_MNT_USD
            }
        }
    }
}

impl Default for PriceClient {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_usd(data: &SimplePriceResponse) -> Result<f64> {
    data.0
        .get(MANTLE_ID)
        .and_then(|p| p.usd)
        .filter(|p| *p > 0.0)
        .ok_or_else(|| anyhow::anyhow!("no usd price for {MANTLE_ID}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_usd() {
        let data: SimplePriceResponse =
            serde_json::from_str(r#"{"mantle":{"usd":0.6123}}"#).unwrap();
        assert_eq!(extract_usd(&data).unwrap(), 0.6123);

        let empty: SimplePriceResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_usd(&empty).is_err());

        let zero: SimplePriceResponse = serde_json::from_str(r#"{"mantle":{"usd":0}}"#).unwrap();
        assert!(extract_usd(&zero).is_err());
    }

    #[tokio::test]
    async fn test_fallback_on_unreachable_host() {
        let client = PriceClient::with_base_url("http://127.0.0.1:9");
        assert_eq!(client.mnt_usd_or_fallback().await, FALLBACK_MNT_USD);
    }
}
