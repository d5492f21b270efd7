//! Process-wide settings.
//!
//! Built once in `main` from flags and environment, then threaded by
//! parameter into the API client. Timeout knobs are relative multipliers
//! so deep searches and multi-step explore runs are not misread as hangs.

use std::time::Duration;

/// Environment variable overriding the hosted endpoint (self-hosted
/// deployments).
pub const BASE_URL_ENV: &str = "CODEALIVE_BASE_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DEEP_MULTIPLIER: u32 = 4;
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Resolved per-invocation settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Endpoint override; `None` means the hosted default.
    pub base_url: Option<String>,
    /// Per-request timeout for fast/auto operations.
    pub timeout: Duration,
    /// Deep-mode budget as a multiple of `timeout`.
    pub deep_multiplier: u32,
    /// Retry bound for idempotent reads.
    pub max_retries: u32,
}

impl Settings {
    /// Build settings from CLI overrides. The base URL flag already
    /// carries the `CODEALIVE_BASE_URL` fallback via clap's env support.
    pub fn new(base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        Self {
            base_url: base_url.filter(|url| !url.is_empty()),
            timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            ..Self::default()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            deep_multiplier: DEFAULT_DEEP_MULTIPLIER,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}
