//! Provider configuration trait and error types

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Missing required configuration
    #[error("Missing required configuration: {field}")]
    MissingRequired {
        /// Missing field
        field: String,
    },

    /// Client construction failed
    #[error("Client initialization failed: {0}")]
    ClientInit(String),
}

/// Trait for provider configuration
///
/// Provider configs are validated before any client is built.
///
/// # Contract
///
/// - `validate()` must check all parameters and return errors naming the
///   offending field
/// - `provider_name()` must return a static string for logging
pub trait ProviderConfig: Send + Sync + Clone {
    /// Validate configuration parameters
    fn validate(&self) -> Result<(), ConfigError>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}
