//! Authentication errors and their HTTP rendering.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::jwt::RejectReason;

/// Failures surfaced to clients of the auth endpoints.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No usable `Authorization: Bearer <token>` header
    #[error("Missing or invalid authorization header")]
    MissingToken,
    /// Unknown user or wrong password, deliberately not distinguished
    #[error("Invalid username or password")]
    CredentialMismatch,
    /// Token failed verification on a protected route
    #[error("Token expired or invalid")]
    Rejected(RejectReason),
}

#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_auth_header",
            AuthError::CredentialMismatch => "invalid_credentials",
            AuthError::Rejected(reason) => reason.code(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let reason = match self {
            AuthError::Rejected(reason) => Some(reason.code()),
            _ => None,
        };
        let body = Json(AuthErrorBody {
            success: false,
            message: self.to_string(),
            reason,
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
