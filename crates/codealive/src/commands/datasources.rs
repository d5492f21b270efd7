//! Datasources command - list indexed repositories and workspaces.

use anyhow::Result;
use clap::Args;
use console::Style;

use codealive_client::{DataSource, DEFAULT_BASE_URL};

use super::Context;

/// Arguments for the datasources command.
#[derive(Args, Debug)]
pub struct DatasourcesArgs {
    /// Include data sources still being indexed
    #[arg(long)]
    pub all: bool,
}

/// Run the datasources command.
pub async fn run(args: DatasourcesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let sources = client.datasources().list(!args.all).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&sources)?);
        return Ok(());
    }

    if sources.is_empty() {
        let base_url = ctx
            .settings
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL);
        println!("No data sources found.");
        println!("Add repositories at {}", base_url);
        return Ok(());
    }

    let bold = Style::new().bold();
    let dim = Style::new().dim();

    println!(
        "{}",
        bold.apply_to(format!("Available data sources ({})", sources.len()))
    );

    let (workspaces, repositories): (Vec<&DataSource>, Vec<&DataSource>) =
        sources.iter().partition(|source| source.is_workspace());

    if !workspaces.is_empty() {
        println!();
        println!("{}", bold.apply_to("Workspaces (search across multiple repos)"));
        for workspace in workspaces {
            print_source(workspace, &dim);
        }
    }

    if !repositories.is_empty() {
        println!();
        println!("{}", bold.apply_to("Repositories"));
        for repository in repositories {
            print_source(repository, &dim);
        }
    }

    println!();
    println!(
        "{}",
        dim.apply_to("Use these names with `codealive search` and `codealive chat`; prefix workspace names with workspace: to search all their repos")
    );

    Ok(())
}

fn print_source(source: &DataSource, dim: &Style) {
    let state = match source.state.as_deref() {
        Some(state) if !source.is_alive() => format!(" [{}]", state),
        _ => String::new(),
    };
    println!("  {}{}", source.name, state);
    if let Some(description) = source.description.as_deref() {
        if !description.is_empty() {
            println!("    {}", dim.apply_to(description));
        }
    }
    if let Some(url) = source.url.as_deref() {
        if !url.is_empty() {
            println!("    {}", dim.apply_to(url));
        }
    }
}
