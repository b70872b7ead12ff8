//! `kvcontacts` - manage Azure Key Vault certificate contacts one at a time

mod commands;
mod config;
mod logging;

use clap::{Parser, Subcommand};
use keyvault_contacts::{ContactId, VaultId};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "kvcontacts", version, about, propagate_version = true)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "KVCONTACTS_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `keyvault_contacts=debug`
    #[arg(long, global = true, env = "KVCONTACTS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a contact to a vault's certificate contact list
    Create {
        /// Resource id of the vault
        #[arg(long)]
        key_vault_id: VaultId,
        /// Contact email
        #[arg(long)]
        email: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// Print a contact by id
    Show {
        /// `{vault id}/contacts/{email}`
        #[arg(long)]
        id: ContactId,
    },
    /// Change a contact's name or phone
    Update {
        /// `{vault id}/contacts/{email}`
        #[arg(long)]
        id: ContactId,
        /// New display name; an empty value clears it
        #[arg(long)]
        name: Option<String>,
        /// New phone number; an empty value clears it
        #[arg(long)]
        phone: Option<String>,
    },
    /// Remove a contact
    Delete {
        /// `{vault id}/contacts/{email}`
        #[arg(long)]
        id: ContactId,
    },
    /// Find a contact by vault and email
    Lookup {
        /// Resource id of the vault
        #[arg(long)]
        key_vault_id: VaultId,
        /// Contact email
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = config::CliConfig::load(cli.config.as_deref(), cli.log_level.as_deref())?;
    logging::init(&config.log)?;
    commands::execute(cli.command, &config).await
}
