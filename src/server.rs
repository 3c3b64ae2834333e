//! # Server Module
//!
//! HTTP server setup and route configuration for the auth lab server.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header},
    routing::get,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::credentials::CredentialStore;
use crate::auth::jwt::JwtService;
use crate::config::Config;
use crate::routes;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialStore>,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    pub fn new(credentials: CredentialStore, jwt_service: JwtService) -> Self {
        Self {
            credentials: Arc::new(credentials),
            jwt_service: Arc::new(jwt_service),
        }
    }
}

/// Build the full application router
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .merge(routes::auth::create_auth_routes(app_state.clone()))
        .fallback(routes::not_found)
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
            ),
        )
        .with_state(app_state)
}

/// Starts the HTTP server and serves until Ctrl+C.
pub async fn start(config: Config) -> Result<()> {
    let jwt_service = JwtService::new(&config.auth.signing_key, config.auth.token_lifetime)
        .context("Invalid token configuration")?;
    let user_count = config.auth.credentials.len();
    let app_state = AppState::new(config.auth.credentials, jwt_service);
    let app = build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr} - port may already be in use"))?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!(
        "Token lifetime: {}h, {} user(s) configured",
        config.auth.token_lifetime.num_hours(),
        user_count
    );
    tracing::info!("Available endpoints:");
    tracing::info!("  GET  /health     - Health check");
    tracing::info!("  POST /login      - Authentication");
    tracing::info!("  GET  /protected  - Protected resource (requires token)");
    tracing::info!("  POST /verify     - Token verification");
    tracing::info!("  POST /logout     - Stateless logout");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        let jwt_service = JwtService::new("server-test", Duration::hours(24)).unwrap();
        build_router(AppState::new(CredentialStore::demo(), jwt_service))
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Authentication Lab Backend is running");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let response = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Endpoint not found");
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/login")
                    .header(header::ORIGIN, "https://example.github.io")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
