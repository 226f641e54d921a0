//! Artha API clients for external services.
//!
//! This crate provides HTTP clients for:
//! - Mantle Explorer: top token holders with balance/USD conversion
//! - Nebula: AI chat used for trading signals and portfolio analysis
//! - CoinGecko: MNT spot price

mod explorer;
mod nebula;
mod price;

pub use explorer::{
    balance_from_wei, fallback_holders, map_holders, short_address, AddressInfo, ExplorerClient,
    HolderItem, HolderOrigin, HolderRecord, HolderSnapshot, HoldersResponse, TokenInfo, DEFAULT_EXPLORER_URL,
    DEFAULT_HOLDER_LIMIT, WMNT_TOKEN,
};
pub use nebula::{reply_text, NebulaClient, DEFAULT_NEBULA_URL};
pub use price::{PriceClient, DEFAULT_COINGECKO_URL, FALLBACK_MNT_USD};
