//! Configuration module for environment variables and application settings
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SECRET_KEY` | Token signing key | required |
//! | `JWT_EXPIRATION_HOURS` | Token lifetime in hours | `24` |
//! | `AUTH_USERS` | `name:secret,...` credential list | built-in lab users |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |

use std::env;
use std::fmt;

use anyhow::{Context, Result, anyhow};
use chrono::Duration;

use crate::auth::credentials::CredentialStore;
use crate::auth::jwt::{DEFAULT_LIFETIME_HOURS, MAX_LIFETIME_HOURS};

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Token and credential configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// Shared HMAC signing key
    pub signing_key: String,
    /// Lifetime of issued tokens
    pub token_lifetime: Duration,
    /// Users allowed to log in
    pub credentials: CredentialStore,
}

// The signing key never ends up in logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("credentials", &self.credentials.len())
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signing_key = lookup("SECRET_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("SECRET_KEY environment variable is required"))?;

        let lifetime_hours = match lookup("JWT_EXPIRATION_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("JWT_EXPIRATION_HOURS is not a number: {raw}"))?,
            None => DEFAULT_LIFETIME_HOURS,
        };
        let token_lifetime = Some(lifetime_hours)
            .filter(|hours| (1..=MAX_LIFETIME_HOURS).contains(hours))
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                anyhow!(
                    "JWT_EXPIRATION_HOURS must be between 1 and {MAX_LIFETIME_HOURS}, got {lifetime_hours}"
                )
            })?;

        let credentials = match lookup("AUTH_USERS") {
            Some(raw) => {
                CredentialStore::parse_list(&raw).context("AUTH_USERS is not a valid user list")?
            }
            None => CredentialStore::demo(),
        };
        if credentials.is_empty() {
            return Err(anyhow!("AUTH_USERS must contain at least one user"));
        }

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {raw}"))?,
            None => 5000,
        };

        Ok(Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            auth: AuthConfig {
                signing_key,
                token_lifetime,
                credentials,
            },
        })
    }
}
