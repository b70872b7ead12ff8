//! Error types for certificate contact operations
//!
//! This module defines a three-tier error hierarchy:
//! - [`ContactError`]: Top-level error returned by the controller and data reader
//! - [`ProviderError`]: Failures of the vault resolver or contacts store
//! - [`ValidationError`]: Malformed vault ids, contact ids and emails
//!
//! Absence is not an error. A vault or contact that no longer exists is
//! reported as [`Lookup::Gone`](crate::core::Lookup::Gone) on the `Ok` side.
//!
//! # Error Conversion Examples
//!
//! ```
//! use keyvault_contacts::core::{ContactError, ValidationError};
//!
//! let err: ContactError = ValidationError::EmptyEmail.into();
//! assert!(matches!(err, ContactError::Validation(_)));
//! ```

use std::time::Duration;
use thiserror::Error;

/// Top-level contact error
#[derive(Debug, Error)]
pub enum ContactError {
    /// The existence check for the parent vault failed
    #[error("checking if key vault '{vault_id}' exists: {source}")]
    VaultLookup {
        /// Vault resource id
        vault_id: String,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// The vault exists but its base URL could not be retrieved
    #[error("retrieving base url of key vault '{vault_id}': {source}")]
    VaultBaseUrl {
        /// Vault resource id
        vault_id: String,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// Reading the certificate contact list failed
    #[error("reading certificate contacts of '{vault_url}': {source}")]
    ReadContacts {
        /// Vault base URL
        vault_url: String,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// Writing the certificate contact list back failed
    #[error("writing certificate contacts of '{vault_url}': {source}")]
    WriteContacts {
        /// Vault base URL
        vault_url: String,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// Removing the whole certificate contact list failed
    #[error("deleting certificate contacts of '{vault_url}': {source}")]
    DeleteContacts {
        /// Vault base URL
        vault_url: String,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// A contact with the same email is already present in the vault
    #[error(
        "a certificate contact with the ID '{id}' already exists - it must be imported to be managed"
    )]
    AlreadyExists {
        /// Composite id of the existing contact
        id: String,
    },

    /// Input validation failed
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The operation did not finish before its deadline
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Operation name (create, read, update, delete)
        operation: &'static str,
        /// Deadline that expired
        after: Duration,
    },
}

impl ContactError {
    /// Whether this error asks the caller to import instead of create
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Provider error underneath this error, if any
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::VaultLookup { source, .. }
            | Self::VaultBaseUrl { source, .. }
            | Self::ReadContacts { source, .. }
            | Self::WriteContacts { source, .. }
            | Self::DeleteContacts { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors from the vault resolver and the contacts store
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Remote resource does not exist (HTTP 404)
    #[error("resource not found")]
    NotFound,

    /// Credentials rejected (HTTP 401/403)
    #[error("authorization failed (check principal permissions)")]
    Unauthorized,

    /// Throttled by the remote API (HTTP 429)
    #[error("rate limit exceeded")]
    RateLimited,

    /// Remote server error (HTTP 5xx)
    #[error("server error: status {status}")]
    ServerError {
        /// HTTP status code
        status: u16,
    },

    /// Any other non-success status
    #[error("unexpected response: status {0}")]
    UnexpectedStatus(u16),

    /// Transport failure
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Response body could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),

    /// Token acquisition failed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Backend-specific failure (in-memory backend, custom resolvers)
    #[error("backend error: {0}")]
    Backend(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to a provider error
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError { status },
            other => Self::UnexpectedStatus(other),
        }
    }

    /// Whether the remote reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Vault id is malformed
    #[error("invalid key vault id '{id}': {reason}")]
    InvalidVaultId {
        /// The rejected id
        id: String,
        /// Reason for rejection
        reason: String,
    },

    /// Contact id is malformed
    #[error("invalid certificate contact id '{id}': {reason}")]
    InvalidContactId {
        /// The rejected id
        id: String,
        /// Reason for rejection
        reason: String,
    },

    /// Email is empty
    #[error("email cannot be empty")]
    EmptyEmail,

    /// A field that identifies the contact was changed by an update
    #[error("'{field}' cannot be changed after creation; create a new contact instead")]
    ImmutableField {
        /// Field name
        field: &'static str,
    },
}

/// Result type alias for contact operations
pub type Result<T> = std::result::Result<T, ContactError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(ProviderError::from_status(401), ProviderError::Unauthorized));
        assert!(matches!(ProviderError::from_status(403), ProviderError::Unauthorized));
        assert!(ProviderError::from_status(404).is_not_found());
        assert!(matches!(ProviderError::from_status(429), ProviderError::RateLimited));
        assert!(matches!(
            ProviderError::from_status(503),
            ProviderError::ServerError { status: 503 }
        ));
        assert!(matches!(
            ProviderError::from_status(409),
            ProviderError::UnexpectedStatus(409)
        ));
    }

    #[test]
    fn test_vault_lookup_names_vault() {
        let err = ContactError::VaultLookup {
            vault_id: "/subscriptions/s/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv"
                .to_string(),
            source: ProviderError::Unauthorized,
        };
        assert!(err.to_string().contains("vaults/kv"));
        assert!(err.source().is_some());
        assert!(err.provider_error().is_some());
    }

    #[test]
    fn test_already_exists() {
        let err = ContactError::AlreadyExists {
            id: "x/contacts/a@b.c".to_string(),
        };
        assert!(err.is_already_exists());
        assert!(err.to_string().contains("imported"));
        assert!(err.provider_error().is_none());
    }

    #[test]
    fn test_validation_conversion() {
        let err: ContactError = ValidationError::EmptyEmail.into();
        assert!(!err.is_already_exists());
        assert_eq!(err.to_string(), "validation error: email cannot be empty");
    }
}
