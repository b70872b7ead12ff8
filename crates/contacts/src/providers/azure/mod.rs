//! Azure collaborators
//!
//! Vault existence and base URLs come from Azure Resource Manager; contact
//! lists live on the Key Vault data plane. Both authenticate with bearer
//! tokens from a [`TokenCredential`].

mod auth;
mod keyvault;
mod management;

pub use auth::{AccessTokenCredential, ClientSecretCredential, TokenCredential};
pub use keyvault::KeyVaultContactsClient;
pub use management::ArmVaultResolver;

use super::config::{ConfigError, ProviderConfig};
use crate::core::ProviderError;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// How requests are authenticated
///
/// Secrets are never serialized; `Debug` redacts them.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AzureAuth {
    /// Service principal with a client secret
    ClientSecret {
        /// Directory (tenant) id
        tenant_id: String,
        /// Application (client) id
        client_id: String,
        /// Client secret
        client_secret: SecretString,
    },
    /// Pre-acquired bearer token used for every scope
    AccessToken {
        /// Bearer token
        token: SecretString,
    },
}

impl Default for AzureAuth {
    fn default() -> Self {
        Self::AccessToken {
            token: SecretString::default(),
        }
    }
}

/// Azure endpoints, API versions and credentials
///
/// # Example
///
/// ```
/// use keyvault_contacts::providers::{AzureAuth, AzureConfig, ProviderConfig};
///
/// let config = AzureConfig {
///     auth: AzureAuth::AccessToken { token: "eyJ0eXAi...".into() },
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// Credentials
    pub auth: AzureAuth,

    /// Microsoft Entra ID authority
    pub authority_host: String,

    /// Azure Resource Manager endpoint
    pub resource_manager_endpoint: String,

    /// Token audience for the Key Vault data plane
    pub key_vault_resource: String,

    /// `api-version` for `Microsoft.KeyVault/vaults` lookups
    pub management_api_version: String,

    /// `api-version` for the certificate contacts endpoint
    pub key_vault_api_version: String,

    /// Per-request HTTP timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            auth: AzureAuth::default(),
            authority_host: "https://login.microsoftonline.com/".to_string(),
            resource_manager_endpoint: "https://management.azure.com/".to_string(),
            key_vault_resource: "https://vault.azure.net".to_string(),
            management_api_version: "2019-09-01".to_string(),
            key_vault_api_version: "7.1".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ProviderConfig for AzureConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        parse_url("authority_host", &self.authority_host)?;
        parse_url("resource_manager_endpoint", &self.resource_manager_endpoint)?;
        parse_url("key_vault_resource", &self.key_vault_resource)?;

        require("management_api_version", &self.management_api_version)?;
        require("key_vault_api_version", &self.key_vault_api_version)?;

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout".into(),
                reason: "must be greater than zero".into(),
            });
        }

        match &self.auth {
            AzureAuth::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                require("auth.tenant_id", tenant_id)?;
                require("auth.client_id", client_id)?;
                require("auth.client_secret", client_secret.expose_secret())?;
            }
            AzureAuth::AccessToken { token } => require("auth.token", token.expose_secret())?,
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "AzureKeyVault"
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    require(field, value)?;
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field: field.into(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: field.into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn require(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingRequired {
            field: field.into(),
        });
    }
    Ok(())
}

/// Appends a trailing slash so relative joins keep the last segment
fn as_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Attaches a bearer token for `scope` to `request`
pub(crate) async fn authorized(
    request: reqwest::RequestBuilder,
    credential: &dyn TokenCredential,
    scope: &str,
) -> Result<reqwest::RequestBuilder, ProviderError> {
    let token = credential.token(scope).await?;
    Ok(request.bearer_auth(token.expose_secret()))
}

/// Resolver and store sharing one HTTP client and credential
#[derive(Clone)]
pub struct AzureClients {
    /// Resource Manager vault resolver
    pub vaults: Arc<ArmVaultResolver>,
    /// Key Vault contacts client
    pub contacts: Arc<KeyVaultContactsClient>,
}

impl AzureClients {
    /// Validates `config` and builds both clients
    pub fn connect(config: &AzureConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("keyvault-contacts/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::ClientInit(e.to_string()))?;

        let credential: Arc<dyn TokenCredential> = match &config.auth {
            AzureAuth::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let authority = as_base(parse_url("authority_host", &config.authority_host)?);
                Arc::new(
                    ClientSecretCredential::new(
                        http.clone(),
                        &authority,
                        tenant_id,
                        client_id.clone(),
                        client_secret.expose_secret(),
                    )
                    .map_err(|e| ConfigError::ClientInit(e.to_string()))?,
                )
            }
            AzureAuth::AccessToken { token } => {
                Arc::new(AccessTokenCredential::new(token.expose_secret()))
            }
        };

        let endpoint = as_base(parse_url(
            "resource_manager_endpoint",
            &config.resource_manager_endpoint,
        )?);

        info!(
            provider = config.provider_name(),
            endpoint = %endpoint,
            management_api_version = %config.management_api_version,
            key_vault_api_version = %config.key_vault_api_version,
            "Azure clients initialized"
        );

        Ok(Self {
            vaults: Arc::new(ArmVaultResolver::new(
                http.clone(),
                endpoint,
                config.management_api_version.clone(),
                Arc::clone(&credential),
            )),
            contacts: Arc::new(KeyVaultContactsClient::new(
                http,
                &config.key_vault_resource,
                config.key_vault_api_version.clone(),
                credential,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AzureConfig::default();
        assert_eq!(config.management_api_version, "2019-09-01");
        assert_eq!(config.key_vault_api_version, "7.1");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        // Default token is empty, so validation fails until one is supplied.
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired { field }) if field == "auth.token"
        ));
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let config = AzureConfig {
            auth: AzureAuth::AccessToken { token: "t".into() },
            resource_manager_endpoint: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "resource_manager_endpoint"
        ));
    }

    #[test]
    fn test_auth_deserialize_and_redact() {
        let auth: AzureAuth = serde_json::from_value(serde_json::json!({
            "method": "client_secret",
            "tenant_id": "t",
            "client_id": "c",
            "client_secret": "hunter2-secret"
        }))
        .unwrap();
        let AzureAuth::ClientSecret { client_secret, .. } = &auth else {
            panic!("expected client secret auth");
        };
        assert_eq!(client_secret.expose_secret(), "hunter2-secret");
        assert!(!format!("{auth:?}").contains("hunter2-secret"));
    }

    #[test]
    fn test_as_base_adds_slash() {
        let url = as_base(Url::parse("http://127.0.0.1:9000/arm").unwrap());
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/arm/");
    }

    #[tokio::test]
    async fn test_connect() {
        let config = AzureConfig {
            auth: AzureAuth::ClientSecret {
                tenant_id: "t".into(),
                client_id: "c".into(),
                client_secret: "s".into(),
            },
            ..Default::default()
        };
        assert!(AzureClients::connect(&config).is_ok());
    }
}
