//! Search command - semantic code search across indexed data sources.

use anyhow::Result;
use clap::Args;
use console::Style;

use codealive_client::{SearchMatch, SearchMode, SearchRequest};

use super::Context;

/// Arguments for the search command.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Natural-language description of what to find
    #[arg(required = true)]
    pub query: String,

    /// Data sources to search (repository name or workspace:<name>)
    #[arg(required = true, value_name = "SOURCE")]
    pub data_sources: Vec<String>,

    /// Search mode: auto, fast, or deep
    #[arg(long, default_value = "auto", value_parser = parse_mode)]
    pub mode: SearchMode,

    /// Embed full file content in results (for repositories you cannot
    /// read locally)
    #[arg(long)]
    pub include_content: bool,
}

fn parse_mode(value: &str) -> Result<SearchMode, codealive_client::Error> {
    value.parse()
}

/// Run the search command.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let refs = super::parse_refs(&args.data_sources)?;
    let client = ctx.client()?;

    if ctx.verbose {
        let dim = Style::new().dim();
        eprintln!("{}", dim.apply_to(format!("Searching: {}", args.query)));
        eprintln!(
            "{}",
            dim.apply_to(format!("Sources: {} (mode: {})", args.data_sources.join(", "), args.mode))
        );
    }

    let request = SearchRequest::new(args.query.clone(), refs)
        .with_mode(args.mode)
        .with_content(args.include_content);
    let response = client.search().run(&request).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.matches.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    for (idx, hit) in response.matches.iter().enumerate() {
        print_match(idx + 1, hit);
    }
    println!();
    println!("({} results)", response.matches.len());

    Ok(())
}

fn print_match(idx: usize, hit: &SearchMatch) {
    let bold = Style::new().bold();
    let dim = Style::new().dim();

    println!();
    println!("{}", bold.apply_to(format!("#{} {}", idx, location_of(hit))));
    if let Some(symbol) = hit.symbol() {
        println!("  {} {}", dim.apply_to("Symbol:"), symbol);
    }
    if let Some(source) = hit.source_name() {
        println!("  {} {}", dim.apply_to("Source:"), source);
    }
    if let Some(score) = hit.score {
        println!("  {} {:.2}", dim.apply_to("Relevance:"), score);
    }
    if let Some(snippet) = hit.snippet.as_deref().map(str::trim) {
        if !snippet.is_empty() {
            println!("```");
            println!("{}", snippet);
            println!("```");
        }
    }
}

/// `path:start-end` reference for a match, degrading gracefully when
/// the service omitted pieces.
fn location_of(hit: &SearchMatch) -> String {
    let Some(path) = hit.path() else {
        return "(unknown location)".to_string();
    };
    match hit.lines() {
        Some((start, Some(end))) => format!("{}:{}-{}", path, start, end),
        Some((start, None)) => format!("{}:{}", path, start),
        None => path.to_string(),
    }
}
