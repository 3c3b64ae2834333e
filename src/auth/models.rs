//! Authentication Models
//!
//! Data structures for authentication requests, responses, and user information.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::auth::jwt::VerifiedClaims;

/// Authenticated user information extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<VerifiedClaims> for AuthUser {
    fn from(claims: VerifiedClaims) -> Self {
        Self {
            username: claims.identity,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        }
    }
}

/// Login request payload
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token verification request payload
///
/// `token` is `None` only when the key is absent. A present key of any JSON
/// type, `null` included, is kept so the handler can reject it as a token.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default, deserialize_with = "present")]
    pub token: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Token response after successful authentication
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub username: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn new(token: String, username: String, expires_in: i64) -> Self {
        Self {
            success: true,
            message: "Login successful".to_string(),
            token,
            username,
            expires_in,
        }
    }
}

/// Result of a successful `/verify` call
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub valid: bool,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl From<VerifiedClaims> for VerifyResponse {
    fn from(claims: VerifiedClaims) -> Self {
        Self {
            success: true,
            valid: true,
            username: claims.identity,
            iat: claims.issued_at,
            exp: claims.expires_at,
        }
    }
}
