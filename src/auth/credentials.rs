//! Credential Store
//!
//! Fixed, read-only mapping from username to expected secret, loaded once at startup.

use std::collections::HashMap;

use thiserror::Error;

/// Users available when no `AUTH_USERS` list is configured.
const DEMO_USERS: [(&str, &str); 2] = [("admin", "password123"), ("user", "password123")];

/// Errors raised while building a credential store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("duplicate identity in credential list: {0}")]
    DuplicateIdentity(String),
    #[error("credential entry must not have an empty identity or secret")]
    EmptyField,
    #[error("credential entry is not in `name:secret` form: {0}")]
    InvalidEntry(String),
}

/// Immutable identity -> secret lookup
#[derive(Debug, Clone)]
pub struct CredentialStore {
    entries: HashMap<String, String>,
}

impl CredentialStore {
    /// Build a store from `(identity, secret)` pairs. Identities must be unique.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (identity, secret) in entries {
            let identity = identity.into();
            let secret = secret.into();
            if identity.is_empty() || secret.is_empty() {
                return Err(CredentialError::EmptyField);
            }
            if map.contains_key(&identity) {
                return Err(CredentialError::DuplicateIdentity(identity));
            }
            map.insert(identity, secret);
        }
        Ok(Self { entries: map })
    }

    /// Parse a `name:secret,name:secret` list.
    ///
    /// Whitespace around each entry and around the name is ignored. The secret is
    /// everything after the first `:`.
    pub fn parse_list(raw: &str) -> Result<Self, CredentialError> {
        let mut pairs = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, secret) = entry
                .split_once(':')
                .ok_or_else(|| CredentialError::InvalidEntry(entry.to_string()))?;
            pairs.push((name.trim().to_string(), secret.to_string()));
        }
        Self::from_entries(pairs)
    }

    /// The built-in lab users
    pub fn demo() -> Self {
        Self {
            entries: DEMO_USERS
                .iter()
                .map(|(name, secret)| (name.to_string(), secret.to_string()))
                .collect(),
        }
    }

    /// Check a username/secret pair. Unknown users and wrong secrets both return `false`.
    pub fn authenticate(&self, identity: &str, secret: &str) -> bool {
        self.entries
            .get(identity)
            .is_some_and(|expected| expected.as_bytes() == secret.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
