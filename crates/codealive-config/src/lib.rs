//! Credential resolution and process settings for the CodeAlive CLI.
//!
//! Provides:
//! - API key resolution (environment variable → platform secret store)
//! - At-rest key storage in the OS-native store (macOS Keychain,
//!   Linux Secret Service, Windows Credential Manager)
//! - An explicit [`Settings`] struct built once at startup and threaded
//!   by parameter, never held as ambient global state
//!
//! This crate performs no network access and persists nothing except the
//! credential entry written through [`CredentialStore::store`].

pub mod error;
pub mod secrets;
pub mod settings;

pub use error::{ConfigError, Result};
pub use secrets::{
    resolve, resolve_default, resolve_from, Credential, CredentialSource, CredentialStore,
    SystemStore, API_KEY_ENV,
};
pub use settings::{Settings, BASE_URL_ENV};
