//! Explore command - predefined multi-step exploration workflows.

use anyhow::Result;
use clap::Args;
use console::Style;

use codealive_client::{StepReport, WORKFLOWS};

use super::Context;

/// Arguments for the explore command.
#[derive(Args, Debug)]
pub struct ExploreArgs {
    /// Workflow tag (see --list)
    #[arg(required_unless_present = "list")]
    pub workflow: Option<String>,

    /// What to explore: a feature, library, pattern, or symptom
    #[arg(required_unless_present = "list")]
    pub target: Option<String>,

    /// Data sources to explore (repository name or workspace:<name>)
    #[arg(value_name = "SOURCE")]
    pub data_sources: Vec<String>,

    /// List available workflows
    #[arg(long)]
    pub list: bool,
}

/// Run the explore command.
pub async fn run(args: ExploreArgs, ctx: &Context) -> Result<()> {
    if args.list {
        return list_workflows(ctx);
    }

    let (Some(tag), Some(target)) = (args.workflow, args.target) else {
        anyhow::bail!("workflow tag and target are required (or use --list)");
    };
    let refs = super::parse_refs(&args.data_sources)?;
    let client = ctx.client()?;

    let report = client.explore().run(&tag, &target, &refs).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let bold = Style::new().bold();
    let dim = Style::new().dim();

    println!("{}", bold.apply_to(format!("Explore: {} '{}'", report.tag, report.target)));
    for (idx, step) in report.steps.iter().enumerate() {
        println!();
        match step {
            StepReport::Search { query, matches } => {
                println!(
                    "{}",
                    dim.apply_to(format!("Step {}: searched '{}'", idx + 1, query))
                );
                if matches.is_empty() {
                    println!("  (no matches)");
                }
                for hit in matches.iter().take(5) {
                    match (hit.path(), hit.lines()) {
                        (Some(path), Some((line, _))) => println!("  {}:{}", path, line),
                        (Some(path), None) => println!("  {}", path),
                        _ => {}
                    }
                }
                if matches.len() > 5 {
                    println!("  {}", dim.apply_to(format!("... {} more", matches.len() - 5)));
                }
            }
            StepReport::Chat { answer, .. } => {
                println!("{}", dim.apply_to(format!("Step {}: analysis", idx + 1)));
                println!("{}", dim.apply_to("─".repeat(60)));
                println!("{}", answer);
                println!("{}", dim.apply_to("─".repeat(60)));
            }
        }
    }

    if let Some(conversation_id) = &report.conversation_id {
        println!();
        println!(
            "{}",
            dim.apply_to(format!(
                "Follow up with: codealive chat \"...\" --continue {}",
                conversation_id
            ))
        );
    }

    Ok(())
}

fn list_workflows(ctx: &Context) -> Result<()> {
    if ctx.json_output {
        let listing: Vec<serde_json::Value> = WORKFLOWS
            .iter()
            .map(|workflow| {
                serde_json::json!({
                    "tag": workflow.tag,
                    "description": workflow.description,
                    "steps": workflow.steps.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let bold = Style::new().bold();
    println!("{}", bold.apply_to("Available workflows"));
    for workflow in WORKFLOWS {
        println!("  {:<12} {}", workflow.tag, workflow.description);
    }
    Ok(())
}
