use crate::core::{ProviderError, VaultId};
use async_trait::async_trait;

/// Resolves a vault resource id to its data-plane base URL
///
/// Implementations:
/// - [`ArmVaultResolver`](crate::providers::ArmVaultResolver) - Azure Resource Manager
/// - [`MemoryBackend`](crate::providers::MemoryBackend) - in-process, for tests
#[async_trait]
pub trait VaultResolver: Send + Sync {
    /// Whether the vault currently exists
    ///
    /// A missing vault is `Ok(false)`, not an error.
    async fn exists(&self, vault_id: &VaultId) -> Result<bool, ProviderError>;

    /// Base URL of the vault, e.g. `https://kv-prod.vault.azure.net/`
    async fn base_url(&self, vault_id: &VaultId) -> Result<String, ProviderError>;
}
