//! Vault resolution through Azure Resource Manager

use super::{TokenCredential, authorized};
use crate::core::{ProviderError, VaultId};
use crate::traits::VaultResolver;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct VaultResource {
    #[serde(default)]
    properties: VaultProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultProperties {
    #[serde(default)]
    vault_uri: Option<String>,
}

/// Resolves vaults with `GET {endpoint}{vault_id}?api-version=…`
///
/// 404 means the vault does not exist; `properties.vaultUri` is its base URL.
#[derive(Clone)]
pub struct ArmVaultResolver {
    http: reqwest::Client,
    endpoint: Url,
    api_version: String,
    scope: String,
    credential: Arc<dyn TokenCredential>,
}

impl ArmVaultResolver {
    /// Creates a resolver for the Resource Manager at `endpoint`
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        api_version: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        let scope = format!("{}/.default", endpoint.as_str().trim_end_matches('/'));
        Self {
            http,
            endpoint,
            api_version: api_version.into(),
            scope,
            credential,
        }
    }

    fn vault_url(&self, vault_id: &VaultId) -> Result<Url, ProviderError> {
        let mut url = self
            .endpoint
            .join(vault_id.as_str().trim_start_matches('/'))
            .map_err(|e| ProviderError::Backend(format!("invalid vault request url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn get_vault(&self, vault_id: &VaultId) -> Result<Option<VaultResource>, ProviderError> {
        let url = self.vault_url(vault_id)?;
        let request = authorized(
            self.http.get(url),
            self.credential.as_ref(),
            &self.scope,
        )
        .await?;
        let response = request.send().await.map_err(ProviderError::Network)?;

        match response.status().as_u16() {
            200 => {
                let vault = response
                    .json::<VaultResource>()
                    .await
                    .map_err(|e| ProviderError::Decode(format!("vault resource: {e}")))?;
                Ok(Some(vault))
            }
            404 => {
                debug!(vault_id = %vault_id, "Resource Manager reports vault missing");
                Ok(None)
            }
            status => Err(ProviderError::from_status(status)),
        }
    }
}

#[async_trait]
impl VaultResolver for ArmVaultResolver {
    async fn exists(&self, vault_id: &VaultId) -> Result<bool, ProviderError> {
        Ok(self.get_vault(vault_id).await?.is_some())
    }

    async fn base_url(&self, vault_id: &VaultId) -> Result<String, ProviderError> {
        let vault = self
            .get_vault(vault_id)
            .await?
            .ok_or(ProviderError::NotFound)?;
        vault
            .properties
            .vault_uri
            .ok_or_else(|| ProviderError::Decode("vault resource has no properties.vaultUri".into()))
    }
}
