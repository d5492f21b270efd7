//! Chat command - codebase Q&A with conversation continuation.

use anyhow::Result;
use clap::Args;
use console::Style;
use serde::Serialize;

use codealive_client::Conversation;

use super::Context;

/// Arguments for the chat command.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Question about the codebase
    #[arg(required = true)]
    pub question: String,

    /// Data sources to consult (repository name or workspace:<name>)
    #[arg(value_name = "SOURCE")]
    pub data_sources: Vec<String>,

    /// Continue a previous conversation
    #[arg(long = "continue", value_name = "TOKEN")]
    pub continue_token: Option<String>,
}

/// Chat result for JSON output.
#[derive(Debug, Serialize)]
struct ChatOutput<'a> {
    answer: &'a str,
    conversation_id: &'a str,
}

/// Run the chat command.
pub async fn run(args: ChatArgs, ctx: &Context) -> Result<()> {
    let refs = super::parse_refs(&args.data_sources)?;
    if refs.is_empty() && args.continue_token.is_none() {
        anyhow::bail!(
            "either data sources or --continue <token> is required; \
             run `codealive datasources` to see what is available"
        );
    }

    let client = ctx.client()?;
    let prior = args.continue_token.map(Conversation::resumed);

    if ctx.verbose {
        let dim = Style::new().dim();
        eprintln!("{}", dim.apply_to(format!("Question: {}", args.question)));
        match &prior {
            Some(conversation) => {
                eprintln!("{}", dim.apply_to(format!("Continuing: {}", conversation.id)))
            }
            None => eprintln!(
                "{}",
                dim.apply_to(format!("Analyzing: {}", args.data_sources.join(", ")))
            ),
        }
    }

    let reply = client
        .chat()
        .ask(&args.question, &refs, prior.as_ref())
        .await?;

    if ctx.json_output {
        let output = ChatOutput {
            answer: &reply.answer,
            conversation_id: reply.conversation.id.as_str(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", reply.answer);
    println!();
    let dim = Style::new().dim();
    println!(
        "{}",
        dim.apply_to(format!(
            "Conversation: {} (follow up with --continue {})",
            reply.conversation.id, reply.conversation.id
        ))
    );

    Ok(())
}
