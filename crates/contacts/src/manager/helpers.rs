//! Lookups shared by the resource controller and the data reader

use crate::core::{
    Contact, ContactError, ContactId, ContactState, Lookup, Result, VaultId, find_by_email,
};
use crate::traits::{ContactsStore, VaultResolver};
use tracing::debug;

/// Vault base URL, or `Gone` when the vault no longer exists
pub type VaultLookup = Lookup<String>;

/// Resolves the data-plane base URL of a vault
///
/// A vault that does not exist yields [`Lookup::Gone`]; only a failed check
/// is an error.
pub async fn resolve_vault_base_url(
    vaults: &dyn VaultResolver,
    vault_id: &VaultId,
) -> Result<VaultLookup> {
    let exists = vaults
        .exists(vault_id)
        .await
        .map_err(|source| ContactError::VaultLookup {
            vault_id: vault_id.to_string(),
            source,
        })?;

    if !exists {
        debug!(vault_id = %vault_id, "Key Vault was not found - removing from state");
        return Ok(Lookup::Gone);
    }

    let url = vaults
        .base_url(vault_id)
        .await
        .map_err(|source| ContactError::VaultBaseUrl {
            vault_id: vault_id.to_string(),
            source,
        })?;

    Ok(Lookup::Found(url))
}

/// Fetches the full contact list of a vault
///
/// A vault without a contacts object has an empty list.
pub async fn fetch_contacts(store: &dyn ContactsStore, vault_url: &str) -> Result<Vec<Contact>> {
    match store.get_contacts(vault_url).await {
        Ok(contacts) => Ok(contacts),
        Err(e) if e.is_not_found() => {
            debug!(vault_url, "No certificate contacts object, treating as empty");
            Ok(Vec::new())
        }
        Err(source) => Err(ContactError::ReadContacts {
            vault_url: vault_url.to_string(),
            source,
        }),
    }
}

/// Reads one contact by composite id
pub(crate) async fn lookup_contact(
    vaults: &dyn VaultResolver,
    store: &dyn ContactsStore,
    id: &ContactId,
) -> Result<Lookup<ContactState>> {
    let vault_url = match resolve_vault_base_url(vaults, id.vault_id()).await? {
        Lookup::Found(url) => url,
        Lookup::Gone => return Ok(Lookup::Gone),
    };

    let contacts = fetch_contacts(store, &vault_url).await?;
    match find_by_email(&contacts, id.email()) {
        Some(index) => Ok(Lookup::Found(ContactState::from_contact(
            id.clone(),
            &contacts[index],
        ))),
        None => {
            debug!(contact_id = %id, "Certificate contact was not found - removing from state");
            Ok(Lookup::Gone)
        }
    }
}
