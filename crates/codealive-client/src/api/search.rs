//! Search API.

use crate::client::CodeAliveClient;
use crate::error::{Error, Result};
use crate::types::{join_refs, SearchRequest, SearchResponse, SearchResponseWire};

/// Search API client.
pub struct SearchApi {
    client: CodeAliveClient,
}

impl SearchApi {
    pub(crate) fn new(client: CodeAliveClient) -> Self {
        Self { client }
    }

    /// Run a single-shot search.
    ///
    /// Deep mode runs under the extended timeout budget; results are
    /// "relevant", not "identical", across repeated calls against a
    /// live-indexed corpus.
    pub async fn run(&self, request: &SearchRequest) -> Result<SearchResponse> {
        request.validate()?;

        let mut query: Vec<(&str, String)> = vec![
            ("Query", request.query.clone()),
            ("Mode", request.mode.as_str().to_string()),
            ("IncludeContent", request.include_content.to_string()),
        ];
        for source in &request.data_sources {
            query.push(("Names", source.to_string()));
        }

        let timeout = self.client.timeout_for(request.mode);
        tracing::debug!(
            query = %request.query,
            mode = %request.mode,
            sources = %join_refs(&request.data_sources),
            "searching"
        );

        let wire: SearchResponseWire = self
            .client
            .get_with_query("search", &query, timeout)
            .await
            .map_err(|err| match err {
                // A 404 here means the service has no such corpus.
                Error::Api { status: 404, .. } => {
                    Error::DataSourceNotFound(join_refs(&request.data_sources))
                }
                other => other,
            })?;

        Ok(wire.into())
    }
}
