//! Bearer token acquisition for Azure endpoints

use crate::core::ProviderError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error};
use url::Url;

/// Maximum length for error response body to log (prevents log flooding)
const MAX_ERROR_BODY_LOG_LENGTH: usize = 500;

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Lifetime assumed when the token endpoint does not report one
const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Source of bearer tokens for a given OAuth2 scope
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Bearer token valid for `scope` (e.g. `https://vault.azure.net/.default`)
    async fn token(&self, scope: &str) -> Result<SecretString, ProviderError>;
}

/// A fixed bearer token used for every scope
pub struct AccessTokenCredential {
    token: SecretString,
}

impl AccessTokenCredential {
    /// Wraps an already acquired token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

impl fmt::Debug for AccessTokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenCredential").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenCredential for AccessTokenCredential {
    async fn token(&self, _scope: &str) -> Result<SecretString, ProviderError> {
        Ok(SecretString::from(self.token.expose_secret().to_owned()))
    }
}

struct CachedToken {
    token: SecretString,
    refresh_at: Instant,
}

/// OAuth2 client-credentials grant against Microsoft Entra ID
///
/// Tokens are cached per scope until shortly before they expire.
pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_endpoint: Url,
    client_id: String,
    client_secret: SecretString,
    cache: RwLock<HashMap<String, CachedToken>>,
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl ClientSecretCredential {
    /// Creates a credential for `tenant_id` at `authority_host`
    ///
    /// The token endpoint is `{authority_host}/{tenant_id}/oauth2/v2.0/token`.
    pub fn new(
        http: reqwest::Client,
        authority_host: &Url,
        tenant_id: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let token_endpoint = authority_host
            .join(&format!("{tenant_id}/oauth2/v2.0/token"))
            .map_err(|e| ProviderError::Auth(format!("invalid token endpoint: {e}")))?;

        Ok(Self {
            http,
            token_endpoint,
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            cache: RwLock::new(HashMap::new()),
        })
    }

    async fn request_token(&self, scope: &str) -> Result<CachedToken, ProviderError> {
        debug!(
            client_id = %self.client_id,
            endpoint = %self.token_endpoint,
            scope,
            "Requesting token with client credentials"
        );

        let response = self
            .http
            .post(self.token_endpoint.clone())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("scope", scope),
            ])
            .send()
            .await
            .map_err(ProviderError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::Network)?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %sanitize_response_for_logging(&body),
                "Token request failed"
            );
            return Err(ProviderError::Auth(format!("token endpoint returned HTTP {status}")));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %sanitize_response_for_logging(&body),
                "Failed to parse token response"
            );
            ProviderError::Decode(format!("token response: {e}"))
        })?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN));
        Ok(CachedToken {
            token: SecretString::from(token.access_token),
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn token(&self, scope: &str) -> Result<SecretString, ProviderError> {
        if let Some(cached) = self.cache.read().await.get(scope) {
            if Instant::now() < cached.refresh_at {
                return Ok(SecretString::from(cached.token.expose_secret().to_owned()));
            }
        }

        let fresh = self.request_token(scope).await?;
        let token = SecretString::from(fresh.token.expose_secret().to_owned());
        self.cache.write().await.insert(scope.to_string(), fresh);
        Ok(token)
    }
}

/// Truncate a response body and redact token-like fields before logging
fn sanitize_response_for_logging(body: &str) -> String {
    let truncated = if body.chars().count() > MAX_ERROR_BODY_LOG_LENGTH {
        let head: String = body.chars().take(MAX_ERROR_BODY_LOG_LENGTH).collect();
        format!("{head}... [truncated, {} total bytes]", body.len())
    } else {
        body.to_string()
    };

    if let Ok(mut json) = serde_json::from_str::<serde_json::Value>(&truncated) {
        for field in ["access_token", "refresh_token", "id_token", "client_secret"] {
            if json.get(field).is_some() {
                json[field] = serde_json::json!("[REDACTED]");
            }
        }
        json.to_string()
    } else {
        truncated
    }
}
