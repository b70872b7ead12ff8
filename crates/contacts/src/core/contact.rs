//! Certificate contact records and the state tracked for them

use crate::core::{ContactId, VaultId};
use serde::{Deserialize, Serialize};

/// One entry of a vault's certificate contact list
///
/// Serialized with the Key Vault wire names (`emailAddress`, `name`, `phone`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Email address, the only key the remote list has
    #[serde(rename = "emailAddress", default)]
    pub email: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Contact {
    /// Creates a contact with only an email
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            phone: None,
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Index of the first contact whose email equals `email`
///
/// Comparison is exact: no case folding, no trimming.
pub fn find_by_email(contacts: &[Contact], email: &str) -> Option<usize> {
    contacts.iter().position(|c| c.email == email)
}

/// Desired configuration of a certificate contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Parent vault; changing it means a new contact
    pub key_vault_id: VaultId,

    /// Email; changing it means a new contact
    pub email: String,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
}

impl ContactConfig {
    /// Creates a config with only the required fields
    pub fn new(key_vault_id: VaultId, email: impl Into<String>) -> Self {
        Self {
            key_vault_id,
            email: email.into(),
            name: None,
            phone: None,
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub(crate) fn to_contact(&self) -> Contact {
        Contact {
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Locally tracked state of a certificate contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactState {
    /// Composite id
    pub id: ContactId,

    /// Parent vault
    pub key_vault_id: VaultId,

    /// Email as stored remotely
    pub email: String,

    /// Display name as stored remotely
    pub name: Option<String>,

    /// Phone number as stored remotely
    pub phone: Option<String>,
}

impl ContactState {
    pub(crate) fn from_contact(id: ContactId, contact: &Contact) -> Self {
        Self {
            key_vault_id: id.vault_id().clone(),
            id,
            email: contact.email.clone(),
            name: contact.name.clone(),
            phone: contact.phone.clone(),
        }
    }

    /// Configuration that would reproduce this state
    pub fn to_config(&self) -> ContactConfig {
        ContactConfig {
            key_vault_id: self.key_vault_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Outcome of an operation whose target may have disappeared
///
/// `Gone` means the vault or the contact no longer exists and any locally
/// tracked state should be dropped. Failures travel in `Err`, never here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Target exists
    Found(T),
    /// Vault or contact no longer exists
    Gone,
}

impl<T> Lookup<T> {
    /// Converts into an `Option`, dropping the distinction
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Gone => None,
        }
    }

    /// Whether the target is gone
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Gone)
    }
}
