//! CodeAlive - semantic code search for coding agents.
//!
//! Main entry point for the `codealive` CLI. Each invocation resolves
//! the credential once, performs exactly one logical operation, prints
//! structured output, and exits; conversation continuity is carried by
//! the caller passing tokens back via `--continue`.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;
mod exit;

use codealive_config::Settings;
use commands::{auth, chat, datasources, explore, search, Context};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// CodeAlive - semantic code search across indexed repositories and workspaces
#[derive(Parser)]
#[command(name = "codealive")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API endpoint override for self-hosted deployments
    #[arg(long, global = true, env = "CODEALIVE_BASE_URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (deep searches get a multiple of this)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search indexed code with a natural-language query
    Search(search::SearchArgs),

    /// Ask a question about the indexed code
    Chat(chat::ChatArgs),

    /// Run a predefined multi-step exploration workflow
    Explore(explore::ExploreArgs),

    /// List available repositories and workspaces
    Datasources(datasources::DatasourcesArgs),

    /// Manage the stored API key
    Auth(auth::AuthArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging goes to stderr only; stdout is reserved for results.
    let filter = if cli.verbose {
        "codealive=debug,codealive_client=debug,codealive_config=debug,warn"
    } else {
        "codealive=info,codealive_client=warn,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(cli.verbose)
        .init();

    let settings = Settings::new(cli.base_url, cli.timeout);
    let ctx = Context {
        settings,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Search(args) => search::run(args, &ctx).await,
        Commands::Chat(args) => chat::run(args, &ctx).await,
        Commands::Explore(args) => explore::run(args, &ctx).await,
        Commands::Datasources(args) => datasources::run(args, &ctx).await,
        Commands::Auth(args) => auth::run(args, &ctx).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit::report(&err),
    }
}
