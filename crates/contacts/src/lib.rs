//! Key Vault Contacts - certificate contact management for Azure Key Vault
//!
//! Each contact (email, optional name and phone) is managed as its own
//! resource, although the vault stores all of them as a single list.
//!
//! # Features
//!
//! - **Composite ids** - `{vault resource id}/contacts/{email}`
//! - **Serialized mutations** - one lock per vault guards every read-modify-write
//! - **Soft misses** - a vanished vault or contact reads as [`Lookup::Gone`]
//! - **Pluggable backends** - Azure REST clients or an in-memory backend
#![forbid(unsafe_code)]

/// Core types, ids and errors
pub mod core;
/// Resource controller, data reader and the per-vault lock map
pub mod manager;
/// Azure and in-memory collaborator implementations
pub mod providers;
/// Collaborator traits for vault resolution and contact storage
pub mod traits;

// ── Root re-exports ─────────────────────────────────────────────────────────

// Core types & errors
pub use crate::core::{
    Contact, ContactConfig, ContactError, ContactId, ContactState, Lookup, ProviderError, Result,
    ValidationError, VaultId,
};

// Controller
pub use crate::manager::{ContactDataSource, ContactResource, NamedLocks, Timeouts};

// Traits
pub use crate::traits::{ContactsStore, VaultResolver};

// Providers
pub use crate::providers::{AzureClients, AzureConfig, MemoryBackend};

/// Commonly used types and traits
pub mod prelude {
    pub use crate::core::{
        Contact, ContactConfig, ContactError, ContactId, ContactState, Lookup, ProviderError,
        ValidationError, VaultId,
    };

    pub use crate::manager::{
        ContactDataSource, ContactResource, ContactResourceBuilder, NamedLocks, Timeouts,
    };

    pub use crate::traits::{ContactsStore, VaultResolver};

    pub use crate::providers::{
        AzureAuth, AzureClients, AzureConfig, ConfigError, MemoryBackend, Operation,
        ProviderConfig, TokenCredential,
    };
}
