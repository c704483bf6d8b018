//! Bearer token acquisition.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SheetsConfig;
use crate::error::{SheetsError, SheetsResult};

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Produces a short-lived bearer token for the spreadsheet API.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> SheetsResult<String>;
}

/// Exchanges the stored refresh token for an access token.
///
/// Tokens are not cached: the gateway asks for a fresh one on every call,
/// so each request pays a full exchange round trip. Callers may layer
/// caching on top without changing observable behavior.
pub struct OAuthTokenProvider {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

impl OAuthTokenProvider {
    pub fn new(config: &SheetsConfig) -> Self {
        Self::with_token_url(config, GOOGLE_TOKEN_URL)
    }

    /// Point the exchange at a different token endpoint (used by tests).
    pub fn with_token_url(config: &SheetsConfig, token_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: token_url.into(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

#[async_trait]
impl TokenProvider for OAuthTokenProvider {
    async fn access_token(&self) -> SheetsResult<String> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let body: TokenErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .error_description
                .or(body.error)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(SheetsError::Auth(message));
        }

        let body: TokenBody = response
            .json()
            .await
            .map_err(|e| SheetsError::Network(e.to_string()))?;
        Ok(body.access_token)
    }
}

/// Fixed token, for tests and local development.
pub struct StaticTokenProvider(pub String);

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> SheetsResult<String> {
        Ok(self.0.clone())
    }
}
