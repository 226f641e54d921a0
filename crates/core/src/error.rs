//! Error types for Artha core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArthaError {
    #[error("AI service error: {0}")]
    Ai(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid mode: {0}. Mode must be 0, 1, or 2.")]
    InvalidMode(u8),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ArthaResult<T> = Result<T, ArthaError>;
