//! Read-only certificate contact lookup

use crate::core::{ContactId, ContactState, Lookup, Result, VaultId};
use crate::manager::DEFAULT_TIMEOUT;
use crate::manager::helpers::lookup_contact;
use crate::manager::resource::within;
use crate::traits::{ContactsStore, VaultResolver};
use std::sync::Arc;
use std::time::Duration;

/// Looks up an existing contact by vault and email
///
/// Misses are soft: a missing vault or contact is [`Lookup::Gone`], never an
/// error.
#[derive(Clone)]
pub struct ContactDataSource {
    vaults: Arc<dyn VaultResolver>,
    store: Arc<dyn ContactsStore>,
    timeout: Duration,
}

impl ContactDataSource {
    /// Creates a reader over the given collaborators
    pub fn new(vaults: Arc<dyn VaultResolver>, store: Arc<dyn ContactsStore>) -> Self {
        Self {
            vaults,
            store,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the lookup deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the contact with `email` from the vault's list
    pub async fn read(&self, vault_id: &VaultId, email: &str) -> Result<Lookup<ContactState>> {
        let id = ContactId::new(vault_id.clone(), email)?;
        within(
            "read",
            self.timeout,
            lookup_contact(self.vaults.as_ref(), self.store.as_ref(), &id),
        )
        .await
    }
}
