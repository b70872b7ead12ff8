//! Layered CLI configuration
//!
//! Precedence, lowest first: built-in defaults, the TOML file given with
//! `--config`, `KVCONTACTS_*` environment variables, command-line flags.
//! Nested keys use `__` in the environment, e.g.
//! `KVCONTACTS_AZURE__AUTH__TENANT_ID`.

use crate::logging::LogConfig;
use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use keyvault_contacts::{AzureConfig, Timeouts};
use serde::Deserialize;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "KVCONTACTS_";

/// Everything the CLI needs to build a controller
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Azure endpoints and credentials
    pub azure: AzureConfig,
    /// Operation deadlines
    pub timeouts: Timeouts,
    /// Logging
    pub log: LogConfig,
}

impl CliConfig {
    /// Loads the layered configuration
    pub fn load(file: Option<&Path>, log_level: Option<&str>) -> anyhow::Result<Self> {
        // Unset keys fall back to the `#[serde(default)]` values.
        let mut figment = Figment::new();

        if let Some(path) = file {
            anyhow::ensure!(path.is_file(), "config file not found: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(level) = log_level {
            figment = figment.merge(Serialized::default("log.level", level));
        }

        figment
            .extract()
            .context("failed to load configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Format;
    use keyvault_contacts::providers::AzureAuth;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = CliConfig::load(None, None).unwrap();
        assert_eq!(config.timeouts, Timeouts::default());
        assert_eq!(config.log, LogConfig::default());
        assert_eq!(config.azure.key_vault_api_version, "7.1");
    }

    #[test]
    fn test_file_and_flag_layers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[azure]
request_timeout = "10s"

[azure.auth]
method = "client_secret"
tenant_id = "tenant-1"
client_id = "app-1"
client_secret = "app-secret"

[timeouts]
delete = "90s"

[log]
level = "info"
format = "json"
"#
        )
        .unwrap();

        let config = CliConfig::load(Some(file.path()), Some("debug")).unwrap();

        assert!(matches!(
            config.azure.auth,
            AzureAuth::ClientSecret { ref tenant_id, .. } if tenant_id == "tenant-1"
        ));
        assert_eq!(config.azure.request_timeout, Duration::from_secs(10));
        assert_eq!(config.timeouts.delete, Duration::from_secs(90));
        assert_eq!(config.timeouts.create, Duration::from_secs(300));
        assert_eq!(config.log.format, Format::Json);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_missing_file() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/kvcontacts.toml")), None)
            .unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
