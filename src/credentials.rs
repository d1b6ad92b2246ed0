use std::env;
use std::fmt;

use secrecy::SecretString;

use crate::error::{AppError, AppResult};
use crate::storage::LocalStorage;

pub const API_KEY_VARIABLE: &str = "WORKLOG_OPENAI_API_KEY";
const API_KEY_STORAGE_KEY: &str = "openai_api_key";

/// Holds the user-supplied language-model key in local storage.
pub struct KeyStore {
    storage: LocalStorage,
}

impl KeyStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub fn key(&self) -> Option<&str> {
        self.storage.get_item(API_KEY_STORAGE_KEY)
    }

    pub fn set_key(&mut self, key: &str) -> AppResult<()> {
        self.storage.set_item(API_KEY_STORAGE_KEY, key.trim())
    }

    pub fn remove_key(&mut self) -> AppResult<()> {
        self.storage.remove_item(API_KEY_STORAGE_KEY)
    }
}

pub enum CredentialSource {
    /// Compiled into the binary.
    Injected(Option<&'static str>),
    /// Read from the process environment at resolve time.
    Environment(String),
    Stored(KeyStore),
}

impl CredentialSource {
    fn value(&self) -> Option<String> {
        match self {
            CredentialSource::Injected(value) => value.map(str::to_string),
            CredentialSource::Environment(name) => env::var(name).ok(),
            CredentialSource::Stored(store) => store.key().map(str::to_string),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CredentialSource::Injected(_) => "build-time value",
            CredentialSource::Environment(_) => "environment variable",
            CredentialSource::Stored(_) => "stored key",
        }
    }
}

pub struct ResolvedCredential {
    pub key: SecretString,
    pub source: &'static str,
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Ordered list of places a credential may come from; the first non-empty one wins.
pub struct CredentialChain {
    sources: Vec<CredentialSource>,
}

impl CredentialChain {
    pub fn new(sources: Vec<CredentialSource>) -> Self {
        Self { sources }
    }

    /// Build-time value, then the runtime environment, then the stored key.
    pub fn standard(store: KeyStore) -> Self {
        Self::new(vec![
            CredentialSource::Injected(option_env!("WORKLOG_OPENAI_API_KEY")),
            CredentialSource::Environment(API_KEY_VARIABLE.to_string()),
            CredentialSource::Stored(store),
        ])
    }

    pub fn resolve(&self) -> Option<ResolvedCredential> {
        self.sources.iter().find_map(|source| {
            source
                .value()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(|value| ResolvedCredential {
                    key: SecretString::from(value),
                    source: source.label(),
                })
        })
    }

    /// Like [`resolve`](Self::resolve), but a missing credential is a configuration error.
    pub fn require(&self) -> AppResult<ResolvedCredential> {
        self.resolve().ok_or_else(|| {
            AppError::Configuration(format!(
                "missing language model credential; set {API_KEY_VARIABLE} or run `worklog config set-key`"
            ))
        })
    }
}
