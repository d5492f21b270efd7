//! Client error types.
//!
//! Every failure surfaces as one of these kinds; transport-library types
//! never cross this boundary, so callers (and the CLI's exit-code
//! mapping) can branch on the kind alone.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was available when the client was built. The request
    /// short-circuits before any network I/O.
    #[error("no API key configured. Run `codealive auth set` or export CODEALIVE_API_KEY")]
    NoCredential,

    /// The service rejected the key. Distinct from `NoCredential`: the
    /// fix is a *new* key, not merely *a* key.
    #[error("authentication failed: {0}. The API key was rejected; create a new one and run `codealive auth set`")]
    AuthenticationFailed(String),

    /// A supplied data source name is unknown to the service.
    #[error("data source not found: {0}. Check the name with `codealive datasources`")]
    DataSourceNotFound(String),

    /// Network-level failure: connection refused, DNS, or timeout.
    #[error("transport error: {0}. Check your network and any CODEALIVE_BASE_URL override")]
    Transport(String),

    /// The continuation token is no longer valid server-side.
    #[error("conversation expired or unknown; start a fresh chat without --continue")]
    ExpiredConversation,

    /// Explore tag missing from the workflow registry.
    #[error("unknown workflow '{0}'. Run `codealive explore --list` to see available workflows")]
    UnknownWorkflow(String),

    /// The service answered 2xx with a body this client cannot parse.
    /// A bug report target, not a retry target.
    #[error("malformed response from service: {0}")]
    MalformedResponse(String),

    /// Continuation attempted with a different data-source set than the
    /// conversation was created with.
    #[error("data sources [{supplied}] do not match the conversation's original set [{expected}]; start a fresh chat for the new sources")]
    DataSourceMismatch {
        /// The conversation's original set.
        expected: String,
        /// What this call supplied.
        supplied: String,
    },

    /// Any other non-success response from the service.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// Invalid client-side configuration or request.
    #[error("invalid request: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::AuthenticationFailed(_))
    }

    /// Check if this failure may be retried for an idempotent read:
    /// transport-class failures and gateway errors only. Chat turns are
    /// never retried regardless.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
            || matches!(self, Error::Api { status: 502..=504, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::MalformedResponse(err.to_string())
        } else {
            // Timeouts, connect failures, and DNS errors are all
            // transport-class.
            Error::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {}", err))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error payload shape used by the service (either field may carry the
/// detail).
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
