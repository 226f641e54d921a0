//! Mantle Explorer (Blockscout v2) client for token holder discovery.

use alloy::primitives::U256;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Default explorer base URL (Mantle mainnet).
pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.mantle.xyz";

/// Wrapped MNT token contract on Mantle mainnet.
pub const WMNT_TOKEN: &str = "0x78c1b0C915c4FAA5FffA6CAbf0219DA63d7f4cb8";

/// Default number of holders kept from the response.
pub const DEFAULT_HOLDER_LIMIT: usize = 10;

/// Placeholder: the holders endpoint carries no activity timestamp.
pub const LAST_ACTIVITY_PLACEHOLDER: &str = "Recently";

/// 10^14, the first of the two divisions applied to an 18-decimal amount.
const WEI_TRUNCATION_DIVISOR: u64 = 100_000_000_000_000;

/// Remaining 10^4 after truncation, kept as the 4 displayed decimals.
const DISPLAY_SCALE: f64 = 10_000.0;

/// Mantle Explorer API client.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: reqwest::Client,
    base_url: String,
    token_address: String,
    limit: usize,
}

impl ExplorerClient {
    /// Create a client for the WMNT holders list on Mantle mainnet.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_EXPLORER_URL.to_string(),
            token_address: WMNT_TOKEN.to_string(),
            limit: DEFAULT_HOLDER_LIMIT,
        }
    }

    /// Create a client with custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new()
        }
    }

    /// Track a different token.
    pub fn with_token(mut self, token_address: impl Into<String>) -> Self {
        self.token_address = token_address.into();
        self
    }

    /// Change how many holders are kept.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Token whose holders are fetched.
    pub fn token_address(&self) -> &str {
        &self.token_address
    }

    fn holders_url(&self) -> String {
        format!(
            "{}/api/v2/tokens/{}/holders",
            self.base_url.trim_end_matches('/'),
            self.token_address
        )
    }

    /// Fetch the top holders of the configured token.
    ///
    /// Fails on a non-success status, a body without an `items` array,
    /// or any holder whose `value` is not an unsigned integer.
    #[instrument(skip(self), fields(token = %self.token_address))]
    pub async fn fetch_top_holders(&self) -> Result<Vec<HolderRecord>> {
        let url = self.holders_url();
        debug!(url = %url, "Fetching token holders");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!(
                "Failed to fetch data: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
        }

        let body: serde_json::Value = response.json().await?;
        let data: HoldersResponse = parse_holders_response(body)?;

        let holders = map_holders(&data.items, self.limit)?;

        info!(
            available = data.items.len(),
            kept = holders.len(),
            "Retrieved top holders from Mantle Explorer"
        );

        Ok(holders)
    }
}

impl Default for ExplorerClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate the response shape before deserializing into typed items.
fn parse_holders_response(body: serde_json::Value) -> Result<HoldersResponse> {
    match body.get("items") {
        Some(items) if items.is_array() => {}
        _ => {
            warn!(response = %body, "Unexpected API response structure");
            anyhow::bail!("API response does not contain items array");
        }
    }
    serde_json::from_value(body).context("malformed holders response")
}

/// Map the first `limit` explorer items into ranked holder records.
pub fn map_holders(items: &[HolderItem], limit: usize) -> Result<Vec<HolderRecord>> {
    items
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, item)| HolderRecord::from_item(index + 1, item))
        .collect()
}

/// Convert an 18-decimal integer amount into a display balance truncated
/// to 4 decimal places.
pub fn balance_from_wei(value: &str) -> Result<f64> {
    let wei: U256 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid token amount: {value:?}"))?;
    let truncated = wei / U256::from(WEI_TRUNCATION_DIVISOR);
    Ok(f64::from(truncated) / DISPLAY_SCALE)
}

/// `0x5d54d430...C16D` -> `0x5d54...C16D`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Response wrapper for the holders endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HoldersResponse {
    pub items: Vec<HolderItem>,
}

/// One holder entry as returned by the explorer.
#[derive(Debug, Clone, Deserialize)]
pub struct HolderItem {
    pub address: AddressInfo,
    pub token: TokenInfo,
    /// Integer amount in the token's smallest unit (string in API response)
    pub value: String,
}

/// Address metadata attached to a holder.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInfo {
    pub hash: String,
    #[serde(default)]
    pub is_contract: bool,
    #[serde(default)]
    pub name: Option<String>,
}

/// Token metadata attached to a holder.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    /// USD price per whole token (string in API response, may be null)
    #[serde(default)]
    pub exchange_rate: Option<String>,
}

impl TokenInfo {
    /// Exchange rate as a number, 0 when missing or unparsable.
    pub fn rate(&self) -> f64 {
        self.exchange_rate
            .as_deref()
            .and_then(|r| r.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}

/// Display record for one holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderRecord {
    /// 1-based position in the explorer's balance ordering
    pub rank: usize,
    pub address: String,
    pub short_address: String,
    /// Token balance truncated to 4 decimals
    pub balance: f64,
    pub usd_value: f64,
    pub last_activity: String,
    pub is_contract: bool,
    pub name: Option<String>,
}

impl HolderRecord {
    /// Build a record from an explorer item.
    pub fn from_item(rank: usize, item: &HolderItem) -> Result<Self> {
        let balance = balance_from_wei(&item.value)?;
        let usd_value = balance * item.token.rate();
        let name = item
            .address
            .name
            .as_ref()
            .filter(|n| !n.is_empty())
            .cloned();

        Ok(Self {
            rank,
            address: item.address.hash.clone(),
            short_address: short_address(&item.address.hash),
            balance,
            usd_value,
            last_activity: LAST_ACTIVITY_PLACEHOLDER.to_string(),
            is_contract: item.address.is_contract,
            name,
        })
    }

    /// `Contract` or `EOA`.
    pub fn kind(&self) -> &'static str {
        if self.is_contract {
            "Contract"
        } else {
            "EOA"
        }
    }
}

/// Where a holder list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolderOrigin {
    Live,
    Fallback,
}

/// Holder list tagged with its origin.
#[derive(Debug, Clone, Serialize)]
pub struct HolderSnapshot {
    pub source: HolderOrigin,
    pub holders: Vec<HolderRecord>,
}

impl HolderSnapshot {
    pub fn live(holders: Vec<HolderRecord>) -> Self {
        Self {
            source: HolderOrigin::Live,
            holders,
        }
    }

    /// The known holder list.
    pub fn fallback() -> Self {
        Self {
            source: HolderOrigin::Fallback,
            holders: fallback_holders(),
        }
    }
}

/// Known top WMNT holders, served when the explorer is unreachable.
pub fn fallback_holders() -> Vec<HolderRecord> {
    const KNOWN: [(&str, f64, f64, bool, Option<&str>); 10] = [
        ("0x5d54d430D1FD9425976147318E6080479bffC16D", 8_624_576.0, 5_102_690.0, true, Some("Liquidity Book Token")),
        ("0xeAfc4D6d4c3391Cd4Fc10c85D2f5f972d58C0dD5", 4_404_851.0, 2_606_080.0, true, Some("AgniPool")),
        ("0x683696523512636B46A826A7e3D1B0658E8e2e1c", 2_445_617.0, 1_447_024.0, true, Some("Lendle Mantle Market WMNT")),
        ("0x44949636f778fAD2b139E665aee11a2dc84A2976", 1_134_991.0, 671_573.0, true, Some("INIT Wrapped Mantle")),
        ("0x524db930F0886CdE7B5FFFc920Aae85e98C2abfb", 622_429.0, 368_277.0, true, Some("Contract")),
        ("0x15Bb5D31048381c84a157526cEF9513531b8BE1e", 610_297.0, 361_088.0, false, None),
        ("0x763868612858358f62b05691dB82Ad35a9b3E110", 569_070.0, 336_695.0, true, Some("Moe LP Token")),
        ("0x762B916297235dc920a8c684419e41Ab0099A242", 172_648.0, 102_146.0, true, Some("Volatile Pair - WMNT/CLEO")),
        ("0x1606C79bE3EBD70D8d40bAc6287e23005CfBefA2", 167_449.0, 99_077.0, true, Some("Liquidity Book Token")),
        ("0x6Cc1560EFe633E8799226c87c45981ef93cFa617", 166_080.0, 98_263.0, true, Some("Minterest Wrapped MNT")),
    ];

    KNOWN
        .iter()
        .enumerate()
        .map(|(index, (address, balance, usd_value, is_contract, name))| HolderRecord {
            rank: index + 1,
            address: address.to_string(),
            short_address: short_address(address),
            balance: *balance,
            usd_value: *usd_value,
            last_activity: LAST_ACTIVITY_PLACEHOLDER.to_string(),
            is_contract: *is_contract,
            name: name.map(str::to_string),
        })
        .collect()
}
