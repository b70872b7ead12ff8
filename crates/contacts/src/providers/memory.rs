//! In-memory vault resolver and contacts store
//!
//! Provides in-process storage with error simulation, call counting and
//! artificial latency for exercising locking and deadlines.

use crate::core::{Contact, ProviderError, VaultId};
use crate::traits::{ContactsStore, VaultResolver};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Backend call that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`VaultResolver::exists`]
    Exists,
    /// [`VaultResolver::base_url`]
    BaseUrl,
    /// [`ContactsStore::get_contacts`]
    GetContacts,
    /// [`ContactsStore::set_contacts`]
    SetContacts,
    /// [`ContactsStore::delete_contacts`]
    DeleteContacts,
}

/// In-memory implementation of both collaborator traits
///
/// Vaults are keyed by resource id; contact lists by vault URL. A URL with no
/// entry has no contacts object, which is distinct from an empty list.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    vaults: DashMap<String, String>,
    contacts: DashMap<String, Vec<Contact>>,
    failures: DashSet<Operation>,
    latency: Duration,
    get_calls: AtomicU32,
    set_calls: AtomicU32,
    delete_calls: AtomicU32,
}

impl MemoryBackend {
    /// Create empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every contact list read by `latency`
    ///
    /// Widens the window between reading and writing a list so concurrent
    /// writers would interleave without the vault lock.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Registers a vault and returns its base URL
    pub fn add_vault(&self, vault_id: &VaultId) -> String {
        let url = format!("https://{}.vault.azure.net/", vault_id.name());
        self.vaults.insert(key(vault_id), url.clone());
        url
    }

    /// Removes a vault; its contact list stays addressable by URL
    pub fn remove_vault(&self, vault_id: &VaultId) {
        self.vaults.remove(&key(vault_id));
    }

    /// Replaces the stored list without counting a call
    pub fn seed(&self, vault_url: &str, contacts: Vec<Contact>) {
        self.contacts.insert(vault_url.to_string(), contacts);
    }

    /// Stored list, `None` when there is no contacts object
    pub fn contacts(&self, vault_url: &str) -> Option<Vec<Contact>> {
        self.contacts.get(vault_url).map(|list| list.clone())
    }

    /// Make the next call of `operation` fail
    pub fn fail_next(&self, operation: Operation) {
        self.failures.insert(operation);
    }

    /// Number of `get_contacts` calls
    pub fn get_calls(&self) -> u32 {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Number of `set_contacts` calls
    pub fn set_calls(&self) -> u32 {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Number of `delete_contacts` calls
    pub fn delete_calls(&self) -> u32 {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn check(&self, operation: Operation) -> Result<(), ProviderError> {
        if self.failures.remove(&operation).is_some() {
            return Err(ProviderError::Backend(format!(
                "simulated {operation:?} failure"
            )));
        }
        Ok(())
    }
}

fn key(vault_id: &VaultId) -> String {
    vault_id.as_str().to_ascii_lowercase()
}

#[async_trait]
impl VaultResolver for MemoryBackend {
    async fn exists(&self, vault_id: &VaultId) -> Result<bool, ProviderError> {
        self.check(Operation::Exists)?;
        Ok(self.vaults.contains_key(&key(vault_id)))
    }

    async fn base_url(&self, vault_id: &VaultId) -> Result<String, ProviderError> {
        self.check(Operation::BaseUrl)?;
        self.vaults
            .get(&key(vault_id))
            .map(|url| url.clone())
            .ok_or(ProviderError::NotFound)
    }
}

#[async_trait]
impl ContactsStore for MemoryBackend {
    async fn get_contacts(&self, vault_url: &str) -> Result<Vec<Contact>, ProviderError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::GetContacts)?;
        let snapshot = self.contacts(vault_url);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        snapshot.ok_or(ProviderError::NotFound)
    }

    async fn set_contacts(
        &self,
        vault_url: &str,
        contacts: &[Contact],
    ) -> Result<(), ProviderError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::SetContacts)?;
        self.contacts.insert(vault_url.to_string(), contacts.to_vec());
        Ok(())
    }

    async fn delete_contacts(&self, vault_url: &str) -> Result<(), ProviderError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Operation::DeleteContacts)?;
        self.contacts.remove(vault_url);
        Ok(())
    }
}
