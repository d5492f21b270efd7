//! API key resolution and at-rest storage in the platform secret store.
//!
//! Resolution order, first match wins:
//! 1. `CODEALIVE_API_KEY` environment variable
//! 2. Platform secret store (macOS Keychain, Linux Secret Service, or
//!    Windows Credential Manager); exactly one backend exists per target
//!
//! Store entries live under service "codealive", account
//! "codealive-api-key". Re-storing overwrites the existing entry.

use std::fmt;

use crate::error::{ConfigError, Result};

/// Environment variable that overrides any stored key.
pub const API_KEY_ENV: &str = "CODEALIVE_API_KEY";

/// Secret store service label.
const SERVICE_NAME: &str = "codealive";

/// Secret store account label.
const ACCOUNT_NAME: &str = "codealive-api-key";

/// A resolved API key with provenance.
///
/// The raw value is only reachable through [`Credential::value`];
/// `Debug` and `Display` render a masked form so the secret cannot leak
/// through logging or error formatting.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    value: String,
    source: CredentialSource,
}

impl Credential {
    fn new(value: String, source: CredentialSource) -> Self {
        Self { value, source }
    }

    /// The raw secret, for the auth header only.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Where the secret was found.
    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    /// Masked rendering: first and last four characters for long keys,
    /// stars otherwise.
    pub fn masked(&self) -> String {
        if self.value.len() > 8 {
            format!(
                "{}...{}",
                &self.value[..4],
                &self.value[self.value.len() - 4..]
            )
        } else {
            "****".to_string()
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &self.masked())
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// Where a credential was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Environment variable.
    Env,
    /// OS secret store (Keychain, Secret Service, Credential Manager).
    SecretStore,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Env => write!(f, "env var {}", API_KEY_ENV),
            CredentialSource::SecretStore => write!(f, "platform secret store"),
        }
    }
}

/// Read/write access to at-rest credential storage.
///
/// One concrete strategy is selected per platform and held for the
/// process lifetime; tests substitute an in-memory implementation.
pub trait CredentialStore {
    /// Read the stored key, `None` when no entry exists.
    fn retrieve(&self) -> Result<Option<String>>;

    /// Write the key, overwriting any existing entry.
    fn store(&self, value: &str) -> Result<()>;

    /// Delete the stored entry if present.
    fn delete(&self) -> Result<()>;
}

/// The platform-native secret store.
///
/// The backend (Keychain, Secret Service, Credential Manager) is chosen
/// by target at build time through the keyring crate's per-platform
/// features; only one is ever compiled in.
pub struct SystemStore;

impl SystemStore {
    fn entry() -> Result<keyring::Entry> {
        keyring::Entry::new(SERVICE_NAME, ACCOUNT_NAME)
            .map_err(|e| ConfigError::SecretStore(e.to_string()))
    }
}

impl CredentialStore for SystemStore {
    fn retrieve(&self) -> Result<Option<String>> {
        // Skip real store access under test to keep unit tests isolated
        // from local machine state (and macOS Keychain prompts).
        if cfg!(test) {
            return Ok(None);
        }
        match Self::entry()?.get_password() {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ConfigError::SecretStore(e.to_string())),
        }
    }

    fn store(&self, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidCredential(
                "key must not be empty".to_string(),
            ));
        }
        if cfg!(test) {
            return Err(ConfigError::SecretStore(
                "secret store access disabled in tests".to_string(),
            ));
        }
        Self::entry()?
            .set_password(value)
            .map_err(|e| ConfigError::SecretStore(e.to_string()))
    }

    fn delete(&self) -> Result<()> {
        if cfg!(test) {
            return Err(ConfigError::SecretStore(
                "secret store access disabled in tests".to_string(),
            ));
        }
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ConfigError::SecretStore(e.to_string())),
        }
    }
}

/// Resolve an API key: environment first, then the given store.
///
/// Absence of both is an expected outcome, reported as `None`.
pub fn resolve(store: &dyn CredentialStore) -> Option<Credential> {
    resolve_from(std::env::var(API_KEY_ENV).ok(), store)
}

/// Resolve using the platform store.
pub fn resolve_default() -> Option<Credential> {
    resolve(&SystemStore)
}

/// Resolution core, separated from the process environment so precedence
/// is testable without mutating env vars.
pub fn resolve_from(env_value: Option<String>, store: &dyn CredentialStore) -> Option<Credential> {
    if let Some(value) = env_value {
        if !value.is_empty() {
            return Some(Credential::new(value, CredentialSource::Env));
        }
    }

    // A store that errors out (locked, unavailable) reads as absence.
    match store.retrieve() {
        Ok(Some(value)) => Some(Credential::new(value, CredentialSource::SecretStore)),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory store standing in for the platform backend.
    struct MemoryStore {
        value: RefCell<Option<String>>,
    }

    impl MemoryStore {
        fn empty() -> Self {
            Self {
                value: RefCell::new(None),
            }
        }
    }

    impl CredentialStore for MemoryStore {
        fn retrieve(&self) -> Result<Option<String>> {
            Ok(self.value.borrow().clone())
        }

        fn store(&self, value: &str) -> Result<()> {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidCredential(
                    "key must not be empty".to_string(),
                ));
            }
            *self.value.borrow_mut() = Some(value.to_string());
            Ok(())
        }

        fn delete(&self) -> Result<()> {
            *self.value.borrow_mut() = None;
            Ok(())
        }
    }

    #[test]
    fn test_store_then_resolve_round_trips() {
        let store = MemoryStore::empty();
        store.store("sk-alive-12345678").unwrap();

        let credential = resolve_from(None, &store).unwrap();
        assert_eq!(credential.value(), "sk-alive-12345678");
        assert_eq!(*credential.source(), CredentialSource::SecretStore);
    }

    #[test]
    fn test_resolve_before_store_is_none() {
        let store = MemoryStore::empty();
        assert!(resolve_from(None, &store).is_none());
    }

    #[test]
    fn test_env_takes_precedence_over_store() {
        let store = MemoryStore::empty();
        store.store("stored-key-value").unwrap();

        let credential = resolve_from(Some("env-key-value".to_string()), &store).unwrap();
        assert_eq!(credential.value(), "env-key-value");
        assert_eq!(*credential.source(), CredentialSource::Env);
    }

    #[test]
    fn test_empty_env_value_falls_through_to_store() {
        let store = MemoryStore::empty();
        store.store("stored-key-value").unwrap();

        let credential = resolve_from(Some(String::new()), &store).unwrap();
        assert_eq!(*credential.source(), CredentialSource::SecretStore);
    }

    #[test]
    fn test_restore_overwrites() {
        let store = MemoryStore::empty();
        store.store("first").unwrap();
        store.store("second-key").unwrap();

        let credential = resolve_from(None, &store).unwrap();
        assert_eq!(credential.value(), "second-key");
    }

    #[test]
    fn test_delete_then_resolve_is_none() {
        let store = MemoryStore::empty();
        store.store("short-lived").unwrap();
        store.delete().unwrap();
        assert!(resolve_from(None, &store).is_none());
    }

    #[test]
    fn test_empty_key_rejected_by_store() {
        let store = MemoryStore::empty();
        assert!(store.store("   ").is_err());
    }

    #[test]
    fn test_masked_rendering_hides_middle() {
        let store = MemoryStore::empty();
        store.store("abcd1234efgh5678").unwrap();
        let credential = resolve_from(None, &store).unwrap();

        assert_eq!(credential.masked(), "abcd...5678");
        assert!(!format!("{:?}", credential).contains("1234efgh"));
        assert!(!credential.to_string().contains("1234efgh"));
    }

    #[test]
    fn test_short_key_fully_masked() {
        let credential = resolve_from(Some("tiny".to_string()), &MemoryStore::empty()).unwrap();
        assert_eq!(credential.masked(), "****");
    }

    #[test]
    fn test_system_store_retrieve_no_panic() {
        // Under test the platform store reports absence rather than
        // touching the real backend.
        assert!(SystemStore.retrieve().unwrap().is_none());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(
            CredentialSource::Env.to_string(),
            "env var CODEALIVE_API_KEY"
        );
        assert_eq!(
            CredentialSource::SecretStore.to_string(),
            "platform secret store"
        );
    }
}
