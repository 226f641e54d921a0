//! Configuration for the Artha service.
//!
//! This module provides:
//! - Typed settings for the HTTP listener, explorer, AI service, chain and auth
//! - TOML loading with `${VAR}` expansion
//! - Environment variable overrides

mod env;
mod settings;

pub use env::{expand_env, expand_with};
pub use settings::{
    ArthaConfig, AuthConfig, ChainSettings, ExplorerConfig, NebulaConfig, PriceConfig,
    ServerConfig,
};
