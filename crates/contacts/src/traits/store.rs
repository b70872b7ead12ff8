use crate::core::{Contact, ProviderError};
use async_trait::async_trait;

/// Certificate contact list of a vault, read and written as a whole
///
/// There is no per-entry API upstream: every mutation replaces the full list.
#[async_trait]
pub trait ContactsStore: Send + Sync {
    /// Current contact list
    ///
    /// Returns [`ProviderError::NotFound`] when the vault has no contacts object.
    async fn get_contacts(&self, vault_url: &str) -> Result<Vec<Contact>, ProviderError>;

    /// Replaces the contact list
    async fn set_contacts(&self, vault_url: &str, contacts: &[Contact])
    -> Result<(), ProviderError>;

    /// Removes the contacts object entirely
    async fn delete_contacts(&self, vault_url: &str) -> Result<(), ProviderError>;
}
