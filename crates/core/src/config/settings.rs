//! Service configuration.
//!
//! Loaded from an optional TOML file, then overridden by environment
//! variables (the same names the dashboard deployment uses).

use std::path::Path;

use alloy::primitives::Address;
use artha_api::{DEFAULT_COINGECKO_URL, DEFAULT_EXPLORER_URL, DEFAULT_HOLDER_LIMIT, DEFAULT_NEBULA_URL, WMNT_TOKEN};
use artha_chain::{DEFAULT_SWAP_POOL, DEFAULT_USDC, MANTLE_SEPOLIA_CHAIN_ID, MANTLE_SEPOLIA_RPC};
use serde::{Deserialize, Serialize};

use super::env::expand_env;
use crate::error::{ArthaError, ArthaResult};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArthaConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub explorer: ExplorerConfig,

    #[serde(default)]
    pub nebula: NebulaConfig,

    #[serde(default)]
    pub chain: ChainSettings,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub price: PriceConfig,
}

/// HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Block explorer holder lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_url")]
    pub base_url: String,

    /// Token whose holders are listed
    #[serde(default = "default_token_address")]
    pub token_address: String,

    #[serde(default = "default_holder_limit")]
    pub holder_limit: usize,
}

fn default_explorer_url() -> String {
    DEFAULT_EXPLORER_URL.to_string()
}
fn default_token_address() -> String {
    WMNT_TOKEN.to_string()
}
fn default_holder_limit() -> usize {
    DEFAULT_HOLDER_LIMIT
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_explorer_url(),
            token_address: default_token_address(),
            holder_limit: default_holder_limit(),
        }
    }
}

/// Nebula chat service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NebulaConfig {
    #[serde(default = "default_nebula_url")]
    pub base_url: String,

    /// thirdweb secret key (`THIRDWEB_SECRET_KEY`)
    #[serde(default, skip_serializing)]
    pub secret_key: Option<String>,
}

fn default_nebula_url() -> String {
    DEFAULT_NEBULA_URL.to_string()
}

impl Default for NebulaConfig {
    fn default() -> Self {
        Self {
            base_url: default_nebula_url(),
            secret_key: None,
        }
    }
}

/// Chain access and contract addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSettings {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Signing key for `rebalance` and swaps (`DEPLOYER_PRIVATE_KEY`)
    #[serde(default, skip_serializing)]
    pub deployer_private_key: Option<String>,

    #[serde(default)]
    pub investment_contract: Option<String>,

    #[serde(default = "default_swap_contract")]
    pub swap_contract: String,

    #[serde(default = "default_usdc_contract")]
    pub usdc_contract: String,
}

fn default_rpc_url() -> String {
    MANTLE_SEPOLIA_RPC.to_string()
}
fn default_chain_id() -> u64 {
    MANTLE_SEPOLIA_CHAIN_ID
}
fn default_swap_contract() -> String {
    DEFAULT_SWAP_POOL.to_string()
}
fn default_usdc_contract() -> String {
    DEFAULT_USDC.to_string()
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            deployer_private_key: None,
            investment_contract: None,
            swap_contract: default_swap_contract(),
            usdc_contract: default_usdc_contract(),
        }
    }
}

impl ChainSettings {
    /// Investment contract address, if configured.
    pub fn investment_address(&self) -> ArthaResult<Option<Address>> {
        self.investment_contract
            .as_deref()
            .map(|s| parse_address("investment_contract", s))
            .transpose()
    }

    pub fn swap_address(&self) -> ArthaResult<Address> {
        parse_address("swap_contract", &self.swap_contract)
    }

    pub fn usdc_address(&self) -> ArthaResult<Address> {
        parse_address("usdc_contract", &self.usdc_contract)
    }
}

fn parse_address(field: &str, value: &str) -> ArthaResult<Address> {
    value
        .trim()
        .parse()
        .map_err(|e| ArthaError::Config(format!("{field} is not a valid address ({value}): {e}")))
}

/// Bearer token guarding state-changing routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// `CRON_SECRET`; when unset every authenticated request is rejected
    #[serde(default, skip_serializing)]
    pub cron_secret: Option<String>,
}

/// CoinGecko price lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    #[serde(default = "default_price_url")]
    pub base_url: String,
}

fn default_price_url() -> String {
    DEFAULT_COINGECKO_URL.to_string()
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            base_url: default_price_url(),
        }
    }
}

impl ArthaConfig {
    /// Parse TOML, expanding `${VAR}` placeholders first.
    pub fn from_toml_str(content: &str) -> ArthaResult<Self> {
        toml::from_str(&expand_env(content)).map_err(|e| ArthaError::Config(e.to_string()))
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ArthaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ArthaError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// File named by `ARTHA_CONFIG` (if any), then environment overrides.
    pub fn from_env() -> ArthaResult<Self> {
        let mut config = match std::env::var("ARTHA_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply environment-style overrides from `lookup`.
    ///
    /// Values are taken verbatim; empty values are ignored. Placeholder
    /// expansion applies to file content only.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ArthaResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ArthaError::Config(format!("PORT is not a valid port: {port}")))?;
        }

        if let Some(url) = get("EXPLORER_URL") {
            self.explorer.base_url = url;
        }
        if let Some(token) = get("HOLDERS_TOKEN_ADDRESS") {
            self.explorer.token_address = token;
        }

        if let Some(key) = get("THIRDWEB_SECRET_KEY") {
            self.nebula.secret_key = Some(key);
        }

        if let Some(url) = get("RPC_URL") {
            self.chain.rpc_url = url;
        }
        if let Some(id) = get("CHAIN_ID") {
            self.chain.chain_id = id
                .trim()
                .parse()
                .map_err(|_| ArthaError::Config(format!("CHAIN_ID is not a number: {id}")))?;
        }
        if let Some(key) = get("DEPLOYER_PRIVATE_KEY") {
            self.chain.deployer_private_key = Some(key);
        }
        if let Some(addr) =
            get("INVESTMENT_CONTRACT_ADDRESS").or_else(|| get("NEXT_PUBLIC_INVESTMENT_CONTRACT_ADDRESS"))
        {
            self.chain.investment_contract = Some(addr);
        }
        if let Some(addr) = get("SWAP_CONTRACT_ADDRESS") {
            self.chain.swap_contract = addr;
        }
        if let Some(addr) = get("USDC_CONTRACT_ADDRESS") {
            self.chain.usdc_contract = addr;
        }

        if let Some(secret) = get("CRON_SECRET") {
            self.auth.cron_secret = Some(secret);
        }

        Ok(())
    }

    /// Name of the first variable missing for signed rebalancing, if any.
    pub fn missing_signer_setting(&self) -> Option<&'static str> {
        if self.chain.deployer_private_key.is_none() {
            Some("DEPLOYER_PRIVATE_KEY")
        } else if self.chain.investment_contract.is_none() {
            Some("INVESTMENT_CONTRACT_ADDRESS")
        } else {
            None
        }
    }

    /// Log the current configuration. Secrets are reported as present/absent only.
    pub fn log_config(&self) {
        tracing::info!(bind = %self.server.bind_addr(), "Artha configuration loaded");
        tracing::info!(
            explorer = %self.explorer.base_url,
            token = %self.explorer.token_address,
            limit = self.explorer.holder_limit,
            "Holder source"
        );
        tracing::info!(
            nebula = %self.nebula.base_url,
            has_secret_key = self.nebula.secret_key.is_some(),
            "AI service"
        );
        tracing::info!(
            rpc_url = %self.chain.rpc_url,
            chain_id = self.chain.chain_id,
            has_deployer_key = self.chain.deployer_private_key.is_some(),
            investment = self.chain.investment_contract.as_deref().unwrap_or("-"),
            swap = %self.chain.swap_contract,
            "Chain"
        );
        tracing::info!(has_cron_secret = self.auth.cron_secret.is_some(), "Auth");
    }
}
