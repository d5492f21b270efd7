//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use url::Url;

use crate::api::{ChatApi, DataSourcesApi, ExploreApi, SearchApi};
use crate::error::{Error, ErrorBody, Result};
use crate::types::SearchMode;

/// Hosted service endpoint, overridable for self-hosted deployments.
pub const DEFAULT_BASE_URL: &str = "https://app.codealive.ai";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default deep-mode budget multiplier. Deep searches are server-side
/// multi-pass and must not be cut off on the fast-mode budget.
const DEFAULT_DEEP_MULTIPLIER: u32 = 4;

/// Default retry bound for idempotent reads.
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default backoff between retries.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// CodeAlive API client.
///
/// Provides typed access to the search, chat, explore, and data-source
/// endpoints.
///
/// # Example
///
/// ```no_run
/// use codealive_client::CodeAliveClient;
///
/// # async fn example() -> codealive_client::Result<()> {
/// let client = CodeAliveClient::builder()
///     .base_url("https://alive.internal")
///     .api_key("secret")
///     .build()?;
///
/// let sources = client.datasources().list(true).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CodeAliveClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Whether a credential was supplied at build time.
    pub(crate) has_credential: bool,
    /// Request timeout for fast/auto operations.
    pub(crate) timeout: Duration,
    /// Request timeout for deep searches.
    pub(crate) deep_timeout: Duration,
    /// Retry bound for idempotent reads.
    pub(crate) max_retries: u32,
    /// Backoff between retries.
    pub(crate) retry_backoff: Duration,
}

impl CodeAliveClient {
    /// Get access to the inner client state (for API implementations).
    pub(crate) fn inner(&self) -> &ClientInner {
        &self.inner
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Timeout budget for a search mode.
    pub fn timeout_for(&self, mode: SearchMode) -> Duration {
        match mode {
            SearchMode::Deep => self.inner.deep_timeout,
            SearchMode::Auto | SearchMode::Fast => self.inner.timeout,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the search API.
    pub fn search(&self) -> SearchApi {
        SearchApi::new(self.clone())
    }

    /// Access the chat API.
    pub fn chat(&self) -> ChatApi {
        ChatApi::new(self.clone())
    }

    /// Access the explore API.
    pub fn explore(&self) -> ExploreApi {
        ExploreApi::new(self.clone())
    }

    /// Access the data-source catalog API.
    pub fn datasources(&self) -> DataSourcesApi {
        DataSourcesApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("api/{}", path))
            .map_err(Error::from)
    }

    /// Fail before any I/O when no credential was supplied.
    fn ensure_credential(&self) -> Result<()> {
        if self.inner.has_credential {
            Ok(())
        } else {
            Err(Error::NoCredential)
        }
    }

    /// Make a GET request with query parameters, retried per the
    /// idempotent-read policy: transport failures and gateway errors
    /// only, up to the configured bound.
    pub(crate) async fn get_with_query<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T> {
        self.ensure_credential()?;
        let url = self.url(path)?;

        let mut attempt = 0u32;
        loop {
            match self.send_get(url.clone(), query, timeout).await {
                Err(err) if attempt < self.inner.max_retries && err.is_retryable() => {
                    attempt += 1;
                    tracing::warn!(path, attempt, error = %err, "retrying idempotent request");
                    tokio::time::sleep(self.inner.retry_backoff * attempt).await;
                }
                other => return other,
            }
        }
    }

    async fn send_get<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T> {
        let response = self
            .inner
            .http
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request. Never retried: chat turns mutate server-side
    /// conversation state, and a duplicate request would append a
    /// duplicate turn.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.ensure_credential()?;
        let url = self.url(path)?;
        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| Error::MalformedResponse(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(extract_error(status, &body))
        }
    }
}

/// Map a failed response onto an error kind, pulling the detail out of
/// the service's `message`/`error` body fields when present.
fn extract_error(status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                // Keep raw bodies short; they can be full HTML error pages.
                trimmed.chars().take(200).collect()
            }
        });

    match status.as_u16() {
        401 => Error::AuthenticationFailed(detail),
        403 => Error::Api {
            status: 403,
            message: format!(
                "access denied: {}. The API key may lack permissions for this operation",
                detail
            ),
        },
        429 => Error::Api {
            status: 429,
            message: "rate limit exceeded. Wait before retrying".to_string(),
        },
        code if code >= 500 => Error::Api {
            status: code,
            message: format!("{}. The service may be temporarily unavailable", detail),
        },
        code => Error::Api {
            status: code,
            message: detail,
        },
    }
}

/// Builder for creating a [`CodeAliveClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    deep_multiplier: u32,
    max_retries: u32,
    retry_backoff: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            deep_multiplier: DEFAULT_DEEP_MULTIPLIER,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            user_agent: None,
        }
    }

    /// Set the base URL (defaults to the hosted endpoint).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key. Omitting it builds a client whose every request
    /// fails with [`Error::NoCredential`] before any I/O.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout for fast/auto operations.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the deep-mode budget as a multiple of the base timeout.
    pub fn deep_multiplier(mut self, multiplier: u32) -> Self {
        self.deep_multiplier = multiplier.max(1);
        self
    }

    /// Set the retry bound for idempotent reads.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the backoff between retries.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CodeAliveClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let has_credential = self.api_key.is_some();
        if let Some(key) = &self.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| Error::Config("API key contains invalid header characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("codealive-cli/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(CodeAliveClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                has_credential,
                timeout: self.timeout,
                deep_timeout: self.timeout * self.deep_multiplier.max(1),
                max_retries: self.max_retries,
                retry_backoff: self.retry_backoff,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
