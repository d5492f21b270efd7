//! CLI command handlers.

pub mod auth;
pub mod chat;
pub mod datasources;
pub mod explore;
pub mod search;

use codealive_client::{CodeAliveClient, DataSourceRef};
use codealive_config::Settings;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved process settings.
    pub settings: Settings,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Resolve the credential and construct the API client.
    ///
    /// The credential is resolved fresh on every invocation and exists
    /// only inside the client's auth header afterwards. A missing
    /// credential still builds a client; the request layer fails with
    /// `NoCredential` before any network I/O.
    pub fn client(&self) -> anyhow::Result<CodeAliveClient> {
        let mut builder = CodeAliveClient::builder()
            .timeout(self.settings.timeout)
            .deep_multiplier(self.settings.deep_multiplier)
            .max_retries(self.settings.max_retries);

        if let Some(url) = &self.settings.base_url {
            builder = builder.base_url(url);
        }

        if let Some(credential) = codealive_config::resolve_default() {
            tracing::debug!(source = %credential.source(), "API key resolved");
            builder = builder.api_key(credential.value());
        }

        Ok(builder.build()?)
    }
}

/// Parse raw CLI data-source arguments.
pub(crate) fn parse_refs(raw: &[String]) -> anyhow::Result<Vec<DataSourceRef>> {
    raw.iter()
        .map(|value| DataSourceRef::parse(value).map_err(Into::into))
        .collect()
}
