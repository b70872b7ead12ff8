//! Certificate contact resource controller
//!
//! Every mutation is a read-modify-write of the vault's whole contact list,
//! so create, update and delete hold the vault's named lock for the full
//! cycle. Reads are not locked.

use crate::core::{
    Contact, ContactConfig, ContactError, ContactId, ContactState, Lookup, Result, ValidationError,
    VaultId, find_by_email,
};
use crate::manager::data_source::ContactDataSource;
use crate::manager::helpers::{fetch_contacts, lookup_contact, resolve_vault_base_url};
use crate::manager::{NamedLocks, Timeouts};
use crate::traits::{ContactsStore, VaultResolver};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// CRUD controller for one certificate contact per call
///
/// # Examples
///
/// ```no_run
/// use keyvault_contacts::prelude::*;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = Arc::new(MemoryBackend::new());
/// let resource = ContactResource::builder()
///     .vaults(backend.clone())
///     .contacts(backend)
///     .build();
///
/// let vault: VaultId =
///     "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv-prod".parse()?;
/// let config = ContactConfig::new(vault, "ops@example.com").with_name("Ops");
///
/// if let Lookup::Found(state) = resource.create(&config).await? {
///     println!("created {}", state.id);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ContactResource {
    vaults: Arc<dyn VaultResolver>,
    store: Arc<dyn ContactsStore>,
    locks: Arc<NamedLocks>,
    timeouts: Timeouts,
}

impl ContactResource {
    /// Create builder for constructing a controller
    pub fn builder() -> ContactResourceBuilder<No, No> {
        ContactResourceBuilder::new()
    }

    /// Data reader sharing this controller's collaborators
    pub fn data_source(&self) -> ContactDataSource {
        ContactDataSource::new(Arc::clone(&self.vaults), Arc::clone(&self.store))
            .with_timeout(self.timeouts.read)
    }

    /// Operation deadlines in effect
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Adds a contact to the vault's list
    ///
    /// # Returns
    ///
    /// * `Ok(Lookup::Found(state))` - Contact created, state read back
    /// * `Ok(Lookup::Gone)` - Vault does not exist, nothing written
    /// * `Err(ContactError::AlreadyExists)` - Email already in the list
    pub async fn create(&self, config: &ContactConfig) -> Result<Lookup<ContactState>> {
        within("create", self.timeouts.create, self.create_inner(config)).await
    }

    async fn create_inner(&self, config: &ContactConfig) -> Result<Lookup<ContactState>> {
        let id = ContactId::new(config.key_vault_id.clone(), config.email.clone())?;
        let _guard = self.locks.lock(&lock_name(&config.key_vault_id)).await;

        let vault_url =
            match resolve_vault_base_url(self.vaults.as_ref(), &config.key_vault_id).await? {
                Lookup::Found(url) => url,
                Lookup::Gone => return Ok(Lookup::Gone),
            };

        let mut contacts = fetch_contacts(self.store.as_ref(), &vault_url).await?;
        if find_by_email(&contacts, &config.email).is_some() {
            warn!(contact_id = %id, "Certificate contact already exists");
            return Err(ContactError::AlreadyExists { id: id.to_string() });
        }

        contacts.push(config.to_contact());
        self.write_back(&vault_url, &contacts).await?;
        info!(contact_id = %id, count = contacts.len(), "Certificate contact created");

        lookup_contact(self.vaults.as_ref(), self.store.as_ref(), &id).await
    }

    /// Reads a contact by composite id
    ///
    /// A missing vault or a missing email yields [`Lookup::Gone`].
    pub async fn read(&self, id: &ContactId) -> Result<Lookup<ContactState>> {
        within(
            "read",
            self.timeouts.read,
            lookup_contact(self.vaults.as_ref(), self.store.as_ref(), id),
        )
        .await
    }

    /// Applies changed name/phone to an existing contact
    ///
    /// Nothing is written when `desired` matches `prior`, or when the email
    /// is no longer in the list (update never creates). Either way the
    /// contact is read back afterwards.
    pub async fn update(
        &self,
        prior: &ContactState,
        desired: &ContactConfig,
    ) -> Result<Lookup<ContactState>> {
        within(
            "update",
            self.timeouts.update,
            self.update_inner(prior, desired),
        )
        .await
    }

    async fn update_inner(
        &self,
        prior: &ContactState,
        desired: &ContactConfig,
    ) -> Result<Lookup<ContactState>> {
        if desired.key_vault_id != prior.key_vault_id {
            return Err(ValidationError::ImmutableField {
                field: "key_vault_id",
            }
            .into());
        }
        if desired.email != prior.email {
            return Err(ValidationError::ImmutableField { field: "email" }.into());
        }

        let id = &prior.id;
        if desired.name == prior.name && desired.phone == prior.phone {
            debug!(contact_id = %id, "No changes to certificate contact");
            return lookup_contact(self.vaults.as_ref(), self.store.as_ref(), id).await;
        }

        let _guard = self.locks.lock(&lock_name(&desired.key_vault_id)).await;

        let vault_url =
            match resolve_vault_base_url(self.vaults.as_ref(), &desired.key_vault_id).await? {
                Lookup::Found(url) => url,
                Lookup::Gone => return Ok(Lookup::Gone),
            };

        let mut contacts = fetch_contacts(self.store.as_ref(), &vault_url).await?;
        if let Some(index) = find_by_email(&contacts, &desired.email) {
            contacts[index] = desired.to_contact();
            self.write_back(&vault_url, &contacts).await?;
            info!(contact_id = %id, "Certificate contact updated");
        } else {
            debug!(contact_id = %id, "Certificate contact not in list, nothing to update");
        }

        lookup_contact(self.vaults.as_ref(), self.store.as_ref(), id).await
    }

    /// Removes a contact from the vault's list
    ///
    /// Removing the sole entry deletes the contacts object instead of writing
    /// an empty list. A missing vault or email is not an error.
    pub async fn delete(&self, state: &ContactState) -> Result<()> {
        within("delete", self.timeouts.delete, self.delete_inner(state)).await
    }

    async fn delete_inner(&self, state: &ContactState) -> Result<()> {
        let id = &state.id;
        let _guard = self.locks.lock(&lock_name(&state.key_vault_id)).await;

        let vault_url =
            match resolve_vault_base_url(self.vaults.as_ref(), &state.key_vault_id).await? {
                Lookup::Found(url) => url,
                Lookup::Gone => return Ok(()),
            };

        let mut contacts = fetch_contacts(self.store.as_ref(), &vault_url).await?;
        let Some(index) = find_by_email(&contacts, &state.email) else {
            debug!(contact_id = %id, "Certificate contact already absent");
            return Ok(());
        };

        if contacts.len() > 1 {
            contacts.remove(index);
            self.write_back(&vault_url, &contacts).await?;
        } else {
            // An explicit empty list is not the same as no contacts object.
            self.store
                .delete_contacts(&vault_url)
                .await
                .map_err(|source| ContactError::DeleteContacts {
                    vault_url: vault_url.clone(),
                    source,
                })?;
            contacts.clear();
        }

        info!(contact_id = %id, remaining = contacts.len(), "Certificate contact deleted");
        Ok(())
    }

    async fn write_back(&self, vault_url: &str, contacts: &[Contact]) -> Result<()> {
        self.store
            .set_contacts(vault_url, contacts)
            .await
            .map_err(|source| ContactError::WriteContacts {
                vault_url: vault_url.to_string(),
                source,
            })
    }
}

/// Lock name shared by everything mutating one vault's contact list
fn lock_name(vault_id: &VaultId) -> String {
    format!("key_vault:{}", vault_id.as_str().to_ascii_lowercase())
}

/// Runs `fut` under a deadline
pub(crate) async fn within<T>(
    operation: &'static str,
    after: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| ContactError::Timeout { operation, after })?
}

// Type-level markers for builder typestate pattern
#[doc(hidden)]
pub struct Yes;
#[doc(hidden)]
pub struct No;

/// Builder for [`ContactResource`] with typestate pattern
///
/// Ensures both collaborators are provided at compile time.
pub struct ContactResourceBuilder<HasVaults, HasContacts> {
    vaults: Option<Arc<dyn VaultResolver>>,
    store: Option<Arc<dyn ContactsStore>>,
    locks: Option<Arc<NamedLocks>>,
    timeouts: Timeouts,
    _marker: PhantomData<(HasVaults, HasContacts)>,
}

impl ContactResourceBuilder<No, No> {
    /// Create new builder instance
    pub fn new() -> Self {
        Self {
            vaults: None,
            store: None,
            locks: None,
            timeouts: Timeouts::default(),
            _marker: PhantomData,
        }
    }
}

impl Default for ContactResourceBuilder<No, No> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ContactResourceBuilder<No, C> {
    /// Set vault resolver (required)
    pub fn vaults(self, vaults: Arc<dyn VaultResolver>) -> ContactResourceBuilder<Yes, C> {
        ContactResourceBuilder {
            vaults: Some(vaults),
            store: self.store,
            locks: self.locks,
            timeouts: self.timeouts,
            _marker: PhantomData,
        }
    }
}

impl<V> ContactResourceBuilder<V, No> {
    /// Set contacts store (required)
    pub fn contacts(self, store: Arc<dyn ContactsStore>) -> ContactResourceBuilder<V, Yes> {
        ContactResourceBuilder {
            vaults: self.vaults,
            store: Some(store),
            locks: self.locks,
            timeouts: self.timeouts,
            _marker: PhantomData,
        }
    }
}

impl<V, C> ContactResourceBuilder<V, C> {
    /// Use a private lock map instead of [`NamedLocks::global`]
    ///
    /// Controllers only exclude each other when they share a map.
    pub fn locks(mut self, locks: Arc<NamedLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Set operation deadlines
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

impl ContactResourceBuilder<Yes, Yes> {
    /// Build the controller
    pub fn build(self) -> ContactResource {
        ContactResource {
            // Safe: typestate guarantees Some
            vaults: self.vaults.unwrap(),
            store: self.store.unwrap(),
            locks: self.locks.unwrap_or_else(NamedLocks::global),
            timeouts: self.timeouts,
        }
    }
}
