//! Authentication Middleware
//!
//! Axum middleware for bearer token validation and user authentication.

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::auth::{error::AuthError, models::AuthUser};
use crate::server::AppState;

/// Authentication middleware that validates bearer tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating tokens
    pub async fn validate_token(
        State(state): State<AppState>,
        mut req: Request,
        next: Next,
    ) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let token = match req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
        {
            Some(token) => token.to_string(),
            None => {
                let err = AuthError::MissingToken;
                tracing::warn!("{} {} | Status: 401 | {}", method, path, err.error_code());
                return err.into_response();
            }
        };

        let auth_user = match state.jwt_service.verify(&token, Utc::now()) {
            Ok(claims) => AuthUser::from(claims),
            Err(reason) => {
                let err = AuthError::Rejected(reason);
                tracing::warn!("{} {} | Status: 401 | {}", method, path, err.error_code());
                return err.into_response();
            }
        };

        // Insert the user into request extensions for downstream handlers
        req.extensions_mut().insert(auth_user);

        next.run(req).await
    }
}

/// Pull the token out of an `Authorization` value of the form `Bearer <token>`.
///
/// The scheme is case-insensitive and the value must split into exactly two
/// whitespace-separated parts.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

/// Extension trait for extracting AuthUser from request
pub trait RequestAuthExt {
    fn auth_user(&self) -> Option<&AuthUser>;
    fn require_auth(&self) -> Result<&AuthUser, StatusCode>;
}

impl RequestAuthExt for Request {
    fn auth_user(&self) -> Option<&AuthUser> {
        self.extensions().get::<AuthUser>()
    }

    fn require_auth(&self) -> Result<&AuthUser, StatusCode> {
        self.auth_user().ok_or(StatusCode::UNAUTHORIZED)
    }
}
