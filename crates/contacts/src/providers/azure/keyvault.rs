//! Certificate contacts on the Key Vault data plane
//!
//! `GET | PUT | DELETE {vault_url}/certificates/contacts?api-version=…`

use super::{TokenCredential, authorized};
use crate::core::{Contact, ProviderError};
use crate::traits::ContactsStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ContactsBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, rename = "contacts")]
    contact_list: Option<Vec<Contact>>,
}

/// Key Vault certificate contacts client
#[derive(Clone)]
pub struct KeyVaultContactsClient {
    http: reqwest::Client,
    api_version: String,
    scope: String,
    credential: Arc<dyn TokenCredential>,
}

impl KeyVaultContactsClient {
    /// Creates a client authenticating against `resource`
    /// (e.g. `https://vault.azure.net`)
    pub fn new(
        http: reqwest::Client,
        resource: &str,
        api_version: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        Self {
            http,
            api_version: api_version.into(),
            scope: format!("{}/.default", resource.trim_end_matches('/')),
            credential,
        }
    }

    fn contacts_url(&self, vault_url: &str) -> Result<Url, ProviderError> {
        let base = if vault_url.ends_with('/') {
            vault_url.to_string()
        } else {
            format!("{vault_url}/")
        };
        let mut url = Url::parse(&base)
            .and_then(|base| base.join("certificates/contacts"))
            .map_err(|e| ProviderError::Backend(format!("invalid vault url '{vault_url}': {e}")))?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ProviderError> {
        authorized(request, self.credential.as_ref(), &self.scope)
            .await?
            .send()
            .await
            .map_err(ProviderError::Network)
    }
}

#[async_trait]
impl ContactsStore for KeyVaultContactsClient {
    async fn get_contacts(&self, vault_url: &str) -> Result<Vec<Contact>, ProviderError> {
        let url = self.contacts_url(vault_url)?;
        let response = self.send(self.http.get(url)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16()));
        }

        let body = response
            .json::<ContactsBody>()
            .await
            .map_err(|e| ProviderError::Decode(format!("certificate contacts: {e}")))?;
        Ok(body.contact_list.unwrap_or_default())
    }

    async fn set_contacts(
        &self,
        vault_url: &str,
        contacts: &[Contact],
    ) -> Result<(), ProviderError> {
        let url = self.contacts_url(vault_url)?;
        let body = ContactsBody {
            id: None,
            contact_list: Some(contacts.to_vec()),
        };
        let response = self.send(self.http.put(url).json(&body)).await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProviderError::from_status(status.as_u16()))
        }
    }

    async fn delete_contacts(&self, vault_url: &str) -> Result<(), ProviderError> {
        let url = self.contacts_url(vault_url)?;
        let response = self.send(self.http.delete(url)).await?;

        match response.status().as_u16() {
            // Already gone counts as deleted.
            200..=299 | 404 => Ok(()),
            status => Err(ProviderError::from_status(status)),
        }
    }
}
