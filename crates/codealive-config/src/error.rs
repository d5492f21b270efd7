//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while reading or writing the credential store.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The platform secret store backend failed.
    #[error("secret store error: {0}")]
    SecretStore(String),

    /// A value was rejected before it reached the store.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}
