//! Data-source catalog API.

use crate::client::CodeAliveClient;
use crate::error::Result;
use crate::types::{DataSource, DataSourcePage};

/// Data-source catalog API client.
pub struct DataSourcesApi {
    client: CodeAliveClient,
}

impl DataSourcesApi {
    pub(crate) fn new(client: CodeAliveClient) -> Self {
        Self { client }
    }

    /// List indexed data sources as one flattened sequence.
    ///
    /// `alive_only` restricts the listing to sources ready for use. If
    /// the service paginates, all pages are drained transparently.
    pub async fn list(&self, alive_only: bool) -> Result<Vec<DataSource>> {
        let path = if alive_only {
            "datasources/alive"
        } else {
            "datasources/all"
        };
        let timeout = self.client.inner().timeout;

        let mut all = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: DataSourcePage = self.client.get_with_query(path, &query, timeout).await?;

            match page {
                DataSourcePage::Flat(items) => {
                    all.extend(items);
                    break;
                }
                DataSourcePage::Paged {
                    items,
                    next_page_token,
                } => {
                    all.extend(items);
                    match next_page_token {
                        // A token identical to the one just used would
                        // loop forever; stop instead.
                        Some(next) if !next.is_empty() && Some(&next) != page_token.as_ref() => {
                            page_token = Some(next);
                        }
                        _ => break,
                    }
                }
            }
        }

        tracing::debug!(count = all.len(), alive_only, "listed data sources");
        Ok(all)
    }
}
