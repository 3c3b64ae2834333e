// # Routes Module
//
// - `health`: liveness endpoint
// - `auth`: login, token verification and the protected resource

use axum::{
    http::{Method, Uri},
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Health check and monitoring endpoints
pub mod health;

/// Login, verify, logout and protected endpoints
pub mod auth;

/// Fallback for unknown routes
pub async fn not_found(method: Method, uri: Uri) -> Response {
    tracing::info!("{} {} | Status: 404", method, uri.path());
    ApiError::not_found("Endpoint not found").into_response()
}
