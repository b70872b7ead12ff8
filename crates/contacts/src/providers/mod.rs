//! Collaborator implementations
//!
//! - [`azure`]: Azure Resource Manager vault resolver and Key Vault contacts client
//! - [`memory`]: in-process backend for tests and dry runs

pub mod azure;
pub mod config;
pub mod memory;

pub use azure::{
    AccessTokenCredential, ArmVaultResolver, AzureAuth, AzureClients, AzureConfig,
    ClientSecretCredential, KeyVaultContactsClient, TokenCredential,
};
pub use config::{ConfigError, ProviderConfig};
pub use memory::{MemoryBackend, Operation};
