//! thirdweb Nebula chat client.

use anyhow::Result;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default Nebula API endpoint.
pub const DEFAULT_NEBULA_URL: &str = "https://nebula-api.thirdweb.com";

/// Nebula answers slowly; the default reqwest client has no timeout at all.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Nebula chat client.
#[derive(Clone)]
pub struct NebulaClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: Option<String>,
}

impl std::fmt::Debug for NebulaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NebulaClient")
            .field("base_url", &self.base_url)
            .field("has_secret_key", &self.secret_key.is_some())
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    stream: bool,
}

impl NebulaClient {
    /// Create a new Nebula client authenticated with a thirdweb secret key.
    pub fn new(secret_key: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_NEBULA_URL, secret_key)
    }

    /// Create a client with custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, secret_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
            secret_key: secret_key.filter(|k| !k.is_empty()),
        }
    }

    /// Whether a secret key is configured.
    pub fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Send a single chat message and return the reply text.
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn chat(&self, message: &str) -> Result<String> {
        let Some(secret_key) = self.secret_key.as_deref() else {
            anyhow::bail!("THIRDWEB_SECRET_KEY is not configured");
        };

        let url = format!("{}/chat", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-secret-key", secret_key)
            .json(&ChatRequest {
                message,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Nebula returned {}: {}", status.as_u16(), body);
        }

        let body: serde_json::Value = response.json().await?;
        let text = reply_text(&body);

        debug!(reply_len = text.len(), "Nebula reply received");

        Ok(text)
    }
}

/// The reply's `message` string, or the whole document when there is none.
pub fn reply_text(body: &serde_json::Value) -> String {
    match body.get("message").and_then(|m| m.as_str()) {
        Some(message) => message.to_string(),
        None => body.to_string(),
    }
}
