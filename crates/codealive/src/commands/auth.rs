//! Auth command - stored API key management.
//!
//! The non-interactive core of credential setup: `set` writes the key to
//! the platform secret store, `status` reports presence and provenance
//! (never the full value), `remove` deletes the stored entry.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use codealive_config::{resolve, CredentialStore, SystemStore, API_KEY_ENV};

use super::Context;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Store an API key in the platform secret store
    Set {
        /// Key value; prompted for (hidden) when omitted
        #[arg(long)]
        key: Option<String>,
    },

    /// Show whether a key is configured and where it came from
    Status,

    /// Remove the stored key from the platform secret store
    Remove,
}

/// Auth status for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Set { key } => cmd_set(key),
        AuthCommand::Status => cmd_status(ctx),
        AuthCommand::Remove => cmd_remove(),
    }
}

fn cmd_set(key: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => rpassword::prompt_password("API key (input hidden): ")
            .context("failed to read key from terminal")?,
    };
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("no key provided");
    }

    SystemStore
        .store(key)
        .context("failed to write the platform secret store")?;

    println!("API key stored in the platform secret store.");
    println!("Note: {} takes precedence over the stored key when set.", API_KEY_ENV);
    Ok(())
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let credential = resolve(&SystemStore);

    if ctx.json_output {
        let output = match &credential {
            Some(credential) => StatusOutput {
                configured: true,
                source: Some(credential.source().to_string()),
                key: Some(credential.masked()),
            },
            None => StatusOutput {
                configured: false,
                source: None,
                key: None,
            },
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match credential {
        Some(credential) => {
            println!("API key: {} (from {})", credential.masked(), credential.source());
        }
        None => {
            println!("API key: not configured");
            println!(
                "Run `codealive auth set` or export {} to configure one.",
                API_KEY_ENV
            );
            println!("Get a key at https://app.codealive.ai/settings/api-keys");
        }
    }
    Ok(())
}

fn cmd_remove() -> Result<()> {
    let store = SystemStore;
    let had_entry = store
        .retrieve()
        .context("failed to read the platform secret store")?
        .is_some();

    if !had_entry {
        println!("No stored API key found.");
        return Ok(());
    }

    store
        .delete()
        .context("failed to delete from the platform secret store")?;
    println!("Stored API key removed.");
    Ok(())
}
