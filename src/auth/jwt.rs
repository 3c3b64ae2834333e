//! JWT Token Service
//!
//! Issues and verifies HS256 tokens for authenticated users. The service is
//! built once at startup and never mutated, so it can be shared freely across
//! request handlers.
//!
//! There is no revocation list: a token stays valid until its `exp` claim no
//! matter what happens on the server. Signing is deterministic, the same
//! `(username, now)` pair always yields the same token.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default token lifetime in hours
pub const DEFAULT_LIFETIME_HOURS: i64 = 24;

/// Longest lifetime accepted at construction (ten years)
pub const MAX_LIFETIME_HOURS: i64 = 24 * 365 * 10;

const SEGMENT_DELIMITER: char = '.';
const SEGMENT_COUNT: usize = 3;

/// JWT Claims carried in every token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Authenticated username
    pub username: String,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
}

/// Claims of a token that passed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub identity: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Why a token was not accepted
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

impl RejectReason {
    /// Machine-readable code reported to clients
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::Malformed => "malformed_token",
            RejectReason::BadSignature => "invalid_signature",
            RejectReason::Expired => "token_expired",
        }
    }
}

/// Invalid engine configuration. Fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenConfigError {
    #[error("signing key must not be empty")]
    EmptySigningKey,
    #[error("token lifetime must be positive, got {0} seconds")]
    NonPositiveLifetime(i64),
    #[error("token lifetime must not exceed {MAX_LIFETIME_HOURS} hours, got {0} hours")]
    LifetimeTooLong(i64),
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl JwtService {
    /// Create a new JWT service with the provided secret and token lifetime
    pub fn new(secret: &str, lifetime: Duration) -> Result<Self, TokenConfigError> {
        if secret.is_empty() {
            return Err(TokenConfigError::EmptySigningKey);
        }
        if lifetime <= Duration::zero() {
            return Err(TokenConfigError::NonPositiveLifetime(lifetime.num_seconds()));
        }
        if lifetime > Duration::hours(MAX_LIFETIME_HOURS) {
            return Err(TokenConfigError::LifetimeTooLong(lifetime.num_hours()));
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Expiry is checked against the caller's clock in `verify`, after the signature.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            lifetime,
        })
    }

    /// Configured token lifetime
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Generate a token for an already authenticated user
    pub fn issue(&self, username: &str, now: DateTime<Utc>) -> Result<String> {
        let expiration = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| anyhow!("Token expiry is out of range for issue time {now}"))?;

        let claims = Claims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to encode JWT token")
    }

    /// Validate a token at `now`.
    ///
    /// The signature is checked before any claim is trusted, so a token that is
    /// both forged and expired reports `BadSignature`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedClaims, RejectReason> {
        if token.split(SEGMENT_DELIMITER).count() != SEGMENT_COUNT {
            return Err(RejectReason::Malformed);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => RejectReason::BadSignature,
                _ => RejectReason::Malformed,
            })?
            .claims;

        if claims.exp <= claims.iat {
            return Err(RejectReason::Malformed);
        }
        if now.timestamp() >= claims.exp {
            return Err(RejectReason::Expired);
        }

        Ok(VerifiedClaims {
            identity: claims.username,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
