//! Chat API.
//!
//! Question/answer turns against server-side conversation state,
//! referenced only by an opaque token.

use crate::client::CodeAliveClient;
use crate::error::{Error, Result};
use crate::types::{
    join_refs, sets_differ, ChatMessage, ChatReply, ChatRequestWire, ChatResponseWire,
    Conversation, ConversationId, DataSourceRef,
};

/// Chat API client.
pub struct ChatApi {
    client: CodeAliveClient,
}

impl ChatApi {
    pub(crate) fn new(client: CodeAliveClient) -> Self {
        Self { client }
    }

    /// Ask a question, starting a fresh conversation or continuing
    /// `prior`.
    ///
    /// Chat turns are never retried: a duplicate request would append a
    /// duplicate turn server-side. A continuation whose data-source set
    /// differs from the conversation's original set is rejected: before
    /// any I/O when the set is known locally, otherwise against the set
    /// the service echoes back.
    pub async fn ask(
        &self,
        question: &str,
        refs: &[DataSourceRef],
        prior: Option<&Conversation>,
    ) -> Result<ChatReply> {
        if question.trim().is_empty() {
            return Err(Error::Config("question must not be empty".to_string()));
        }
        if prior.is_none() && refs.is_empty() {
            return Err(Error::Config(
                "either data sources or a conversation to continue is required".to_string(),
            ));
        }
        if let Some(conversation) = prior {
            if conversation.mismatches(refs) {
                return Err(mismatch(&conversation.data_sources, refs));
            }
        }

        let continuing = prior.is_some();
        let body = ChatRequestWire {
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: question.to_string(),
            }],
            stream: false,
            conversation_id: prior.map(|c| c.id.as_str().to_string()),
            names: if continuing {
                None
            } else {
                Some(refs.iter().map(ToString::to_string).collect())
            },
        };

        tracing::debug!(continuing, "sending chat turn");
        let wire: ChatResponseWire = self
            .client
            .post("chat/completions", &body)
            .await
            .map_err(|err| match err {
                // The token is the only thing a continuation can 404 on.
                Error::Api {
                    status: 404 | 410, ..
                } if continuing => Error::ExpiredConversation,
                other => other,
            })?;

        let answer = wire
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .unwrap_or_default();

        let token = wire
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                Error::MalformedResponse("chat response carried no conversation id".to_string())
            })?;

        // The service's echoed set is authoritative for the conversation.
        let echoed: Option<Vec<DataSourceRef>> = wire.data_sources.map(|names| {
            names
                .iter()
                .filter_map(|name| DataSourceRef::parse(name).ok())
                .collect()
        });

        if continuing && !refs.is_empty() {
            if let Some(echoed) = &echoed {
                if !echoed.is_empty() && sets_differ(echoed, refs) {
                    return Err(mismatch(echoed, refs));
                }
            }
        }

        let data_sources = echoed
            .filter(|set| !set.is_empty())
            .or_else(|| {
                prior
                    .filter(|c| !c.data_sources.is_empty())
                    .map(|c| c.data_sources.clone())
            })
            .unwrap_or_else(|| refs.to_vec());

        Ok(ChatReply {
            answer,
            conversation: Conversation {
                id: ConversationId::new(token),
                data_sources,
            },
        })
    }
}

fn mismatch(expected: &[DataSourceRef], supplied: &[DataSourceRef]) -> Error {
    Error::DataSourceMismatch {
        expected: join_refs(expected),
        supplied: join_refs(supplied),
    }
}
