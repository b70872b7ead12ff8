//! Subcommand execution

use crate::Command;
use crate::config::CliConfig;
use anyhow::Context;
use keyvault_contacts::{AzureClients, ContactConfig, ContactResource, ContactState, Lookup};
use std::process::ExitCode;
use tracing::debug;

/// Exit status when the vault or contact no longer exists
const EXIT_GONE: u8 = 2;

pub async fn execute(command: Command, config: &CliConfig) -> anyhow::Result<ExitCode> {
    let resource = connect(config)?;

    match command {
        Command::Create {
            key_vault_id,
            email,
            name,
            phone,
        } => {
            let desired = ContactConfig {
                key_vault_id,
                email,
                name,
                phone,
            };
            let lookup = resource
                .create(&desired)
                .await
                .context("failed to create certificate contact")?;
            emit(lookup, "key vault")
        }
        Command::Show { id } => {
            let lookup = resource
                .read(&id)
                .await
                .with_context(|| format!("failed to read certificate contact '{id}'"))?;
            emit(lookup, "certificate contact")
        }
        Command::Update { id, name, phone } => {
            let prior = match resource
                .read(&id)
                .await
                .with_context(|| format!("failed to read certificate contact '{id}'"))?
            {
                Lookup::Found(state) => state,
                Lookup::Gone => return Ok(gone("certificate contact")),
            };

            let mut desired = prior.to_config();
            if let Some(name) = name {
                desired.name = non_empty(name);
            }
            if let Some(phone) = phone {
                desired.phone = non_empty(phone);
            }

            let lookup = resource
                .update(&prior, &desired)
                .await
                .with_context(|| format!("failed to update certificate contact '{id}'"))?;
            emit(lookup, "certificate contact")
        }
        Command::Delete { id } => {
            let state = match resource
                .read(&id)
                .await
                .with_context(|| format!("failed to read certificate contact '{id}'"))?
            {
                Lookup::Found(state) => state,
                Lookup::Gone => return Ok(gone("certificate contact")),
            };
            resource
                .delete(&state)
                .await
                .with_context(|| format!("failed to delete certificate contact '{id}'"))?;
            println!("{}", serde_json::json!({ "deleted": id }));
            Ok(ExitCode::SUCCESS)
        }
        Command::Lookup {
            key_vault_id,
            email,
        } => {
            let lookup = resource
                .data_source()
                .read(&key_vault_id, &email)
                .await
                .context("failed to look up certificate contact")?;
            emit(lookup, "certificate contact")
        }
    }
}

fn connect(config: &CliConfig) -> anyhow::Result<ContactResource> {
    let clients =
        AzureClients::connect(&config.azure).context("invalid azure configuration")?;
    debug!(timeouts = ?config.timeouts, "Building contact resource");

    Ok(ContactResource::builder()
        .vaults(clients.vaults)
        .contacts(clients.contacts)
        .timeouts(config.timeouts)
        .build())
}

fn emit(lookup: Lookup<ContactState>, what: &str) -> anyhow::Result<ExitCode> {
    match lookup {
        Lookup::Found(state) => {
            let json = serde_json::to_string_pretty(&state)
                .context("failed to serialize contact state")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Lookup::Gone => Ok(gone(what)),
    }
}

fn gone(what: &str) -> ExitCode {
    eprintln!("{what} no longer exists; remove it from local state");
    ExitCode::from(EXIT_GONE)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
