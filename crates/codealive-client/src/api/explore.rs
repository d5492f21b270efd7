//! Explore API.
//!
//! Predefined multi-step search and chat workflows.

use crate::client::CodeAliveClient;
use crate::error::{Error, Result};
use crate::types::{Conversation, DataSourceRef, SearchRequest};
use crate::workflow::{self, ExploreReport, Step, StepReport};

/// Explore API client.
pub struct ExploreApi {
    client: CodeAliveClient,
}

impl ExploreApi {
    pub(crate) fn new(client: CodeAliveClient) -> Self {
        Self { client }
    }

    /// Run a named workflow against `refs`.
    ///
    /// Steps execute strictly sequentially; the conversation token
    /// threads from chat step to chat step within the run. An unknown
    /// tag fails before any network call.
    pub async fn run(
        &self,
        tag: &str,
        target: &str,
        refs: &[DataSourceRef],
    ) -> Result<ExploreReport> {
        let workflow =
            workflow::find(tag).ok_or_else(|| Error::UnknownWorkflow(tag.to_string()))?;
        if target.trim().is_empty() {
            return Err(Error::Config("explore target must not be empty".to_string()));
        }
        if refs.is_empty() {
            return Err(Error::Config(
                "at least one data source is required".to_string(),
            ));
        }

        tracing::debug!(tag = workflow.tag, target, "starting explore run");

        let mut steps = Vec::with_capacity(workflow.steps.len());
        let mut conversation: Option<Conversation> = None;

        for step in workflow.steps {
            match step {
                Step::Search {
                    query,
                    mode,
                    include_content,
                } => {
                    let query = workflow::render(query, target);
                    let request = SearchRequest::new(query.clone(), refs.to_vec())
                        .with_mode(*mode)
                        .with_content(*include_content);
                    let response = self.client.search().run(&request).await?;
                    steps.push(StepReport::Search {
                        query,
                        matches: response.matches,
                    });
                }
                Step::Chat { prompt } => {
                    let question = workflow::render(prompt, target);
                    let reply = self
                        .client
                        .chat()
                        .ask(&question, refs, conversation.as_ref())
                        .await?;
                    conversation = Some(reply.conversation);
                    steps.push(StepReport::Chat {
                        question,
                        answer: reply.answer,
                    });
                }
            }
        }

        Ok(ExploreReport {
            tag: workflow.tag.to_string(),
            target: target.to_string(),
            steps,
            conversation_id: conversation.map(|c| c.id),
        })
    }
}
