//! Local private-key signer bound to an HTTP provider.
//! Uses Alloy providers with the recommended fillers, so nonce, gas and
//! chain id are filled per transaction.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use anyhow::{Context, Result};
use tracing::info;

/// Mantle Sepolia chain id.
pub const MANTLE_SEPOLIA_CHAIN_ID: u64 = 5003;

/// Mantle Sepolia public RPC.
pub const MANTLE_SEPOLIA_RPC: &str = "https://rpc.sepolia.mantle.xyz";

/// Parse a hex private key, with or without the `0x` prefix.
pub fn parse_private_key(private_key: &str) -> Result<PrivateKeySigner> {
    let key_str = private_key.trim().trim_start_matches("0x");
    key_str
        .parse::<PrivateKeySigner>()
        .map_err(|e| anyhow::anyhow!("invalid private key: {e}"))
}

/// Read-only provider for view calls.
pub fn read_provider(rpc_url: &str) -> Result<DynProvider> {
    let url = rpc_url
        .parse()
        .with_context(|| format!("invalid RPC URL: {rpc_url}"))?;
    Ok(ProviderBuilder::new().connect_http(url).erased())
}

/// Signing transaction sender.
#[derive(Clone)]
pub struct TransactionSender {
    /// RPC URL for sending transactions
    rpc_url: String,
    /// Signer address
    pub address: Address,
    /// Chain ID
    chain_id: u64,
    /// Provider with the signing wallet attached
    provider: DynProvider,
}

impl TransactionSender {
    /// Create a sender from a hex private key.
    ///
    /// No RPC call is made here; the first transaction resolves nonce and gas.
    pub fn new(private_key: &str, rpc_url: &str, chain_id: u64) -> Result<Self> {
        let signer = parse_private_key(private_key)?.with_chain_id(Some(chain_id));
        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let url = rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL: {rpc_url}"))?;
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url).erased();

        info!(
            address = %address,
            chain_id = chain_id,
            rpc_url = %rpc_url,
            "Transaction sender initialized"
        );

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            address,
            chain_id,
            provider,
        })
    }

    /// Provider that signs with this sender's key.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

impl std::fmt::Debug for TransactionSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSender")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .finish_non_exhaustive()
    }
}
