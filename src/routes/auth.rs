//! Auth routes for login, token verification and the protected resource

use axum::{
    Json, Router,
    extract::{Request, State, rejection::JsonRejection},
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Value, json};

use crate::auth::{
    error::AuthError,
    jwt::RejectReason,
    middleware::{AuthMiddleware, RequestAuthExt},
    models::{LoginRequest, TokenResponse, VerifyRequest, VerifyResponse},
};
use crate::error::ApiError;
use crate::server::AppState;

/// One line per handled request: method, endpoint, user when known, status.
fn log_request(method: &Method, endpoint: &str, username: Option<&str>, status: StatusCode) {
    match username {
        Some(user) if !user.is_empty() => tracing::info!(
            "{} {} | User: {} | Status: {}",
            method,
            endpoint,
            user,
            status.as_u16()
        ),
        _ => tracing::info!("{} {} | Status: {}", method, endpoint, status.as_u16()),
    }
}

/// `POST /login` with `{"username": "...", "password": "..."}`
pub async fn login(
    State(app_state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        log_request(&Method::POST, "/login", None, StatusCode::BAD_REQUEST);
        return ApiError::bad_request("Request body must be JSON").into_response();
    };

    let username = payload.username.trim();
    let password = payload.password;

    if username.is_empty() || password.trim().is_empty() {
        log_request(&Method::POST, "/login", Some(username), StatusCode::BAD_REQUEST);
        return ApiError::bad_request("Username and password are required").into_response();
    }

    if !app_state.credentials.authenticate(username, &password) {
        log_request(&Method::POST, "/login", Some(username), StatusCode::UNAUTHORIZED);
        return AuthError::CredentialMismatch.into_response();
    }

    let token = match app_state.jwt_service.issue(username, Utc::now()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Token generation error: {:#}", e);
            log_request(
                &Method::POST,
                "/login",
                Some(username),
                StatusCode::INTERNAL_SERVER_ERROR,
            );
            return ApiError::internal("Failed to generate token").into_response();
        }
    };

    log_request(&Method::POST, "/login", Some(username), StatusCode::OK);
    let expires_in = app_state.jwt_service.lifetime().num_seconds();
    Json(TokenResponse::new(token, username.to_string(), expires_in)).into_response()
}

/// `GET /protected`, only reachable through [`AuthMiddleware::validate_token`]
pub async fn protected(req: Request) -> Response {
    let user = match req.require_auth() {
        Ok(user) => user,
        Err(status) => {
            log_request(req.method(), "/protected", None, status);
            return AuthError::MissingToken.into_response();
        }
    };

    log_request(req.method(), "/protected", Some(&user.username), StatusCode::OK);
    Json(json!({
        "success": true,
        "message": "Access granted to protected endpoint",
        "username": user.username,
        "iat": user.issued_at,
        "exp": user.expires_at,
        "timestamp": Utc::now().to_rfc3339(),
    }))
    .into_response()
}

/// `POST /verify` with `{"token": "..."}`
///
/// A `token` key that is present but not a string is a rejected token, not a
/// missing one.
pub async fn verify(
    State(app_state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let token = match payload {
        Ok(Json(VerifyRequest { token: Some(token) })) => token,
        _ => {
            log_request(&Method::POST, "/verify", None, StatusCode::BAD_REQUEST);
            let body = json!({
                "success": false,
                "valid": false,
                "message": "Token is required",
            });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let outcome = match token {
        Value::String(token) => app_state.jwt_service.verify(&token, Utc::now()),
        _ => Err(RejectReason::Malformed),
    };

    match outcome {
        Ok(claims) => {
            log_request(&Method::POST, "/verify", Some(&claims.identity), StatusCode::OK);
            Json(VerifyResponse::from(claims)).into_response()
        }
        Err(reason) => {
            log_request(&Method::POST, "/verify", None, StatusCode::UNAUTHORIZED);
            let body = json!({
                "success": false,
                "valid": false,
                "message": "Token is invalid or expired",
                "reason": reason.code(),
            });
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    }
}

/// Tokens are stateless and cannot be revoked; the client just drops its copy.
pub async fn logout() -> impl IntoResponse {
    log_request(&Method::POST, "/logout", None, StatusCode::NO_CONTENT);
    StatusCode::NO_CONTENT
}

pub fn create_auth_routes(app_state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .route("/protected", get(protected))
        .route_layer(middleware::from_fn_with_state(
            app_state,
            AuthMiddleware::validate_token,
        ));

    Router::new()
        .route("/login", post(login))
        .route("/verify", post(verify))
        .route("/logout", post(logout))
        .merge(protected_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::CredentialStore;
    use crate::auth::jwt::JwtService;
    use crate::server::build_router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request as HttpRequest, header};
    use chrono::{DateTime, Duration};
    use tower::ServiceExt;

    const SECRET: &str = "route-test-secret";

    fn test_state() -> AppState {
        let credentials = CredentialStore::from_entries([("admin", "password123")]).unwrap();
        let jwt_service = JwtService::new(SECRET, Duration::hours(24)).unwrap();
        AppState::new(credentials, jwt_service)
    }

    async fn send(req: HttpRequest<Body>) -> (StatusCode, serde_json::Value) {
        let response = build_router(test_state()).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_protected(authorization: Option<String>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn fresh_token() -> String {
        JwtService::new(SECRET, Duration::hours(24))
            .unwrap()
            .issue("admin", Utc::now())
            .unwrap()
    }

    #[tokio::test]
    async fn login_success_returns_token() {
        let (status, body) = send(post_json(
            "/login",
            json!({"username": "  admin ", "password": "password123"}),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["username"], "admin");
        assert_eq!(body["expiresIn"], 86_400);

        let token = body["token"].as_str().unwrap();
        let claims = JwtService::new(SECRET, Duration::hours(24))
            .unwrap()
            .verify(token, Utc::now())
            .unwrap();
        assert_eq!(claims.identity, "admin");
        assert_eq!(claims.expires_at - claims.issued_at, 86_400);
    }

    #[tokio::test]
    async fn login_wrong_password_and_unknown_user_look_the_same() {
        let (status, wrong_password) = send(post_json(
            "/login",
            json!({"username": "admin", "password": "nope"}),
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, unknown_user) = send(post_json(
            "/login",
            json!({"username": "ghost", "password": "password123"}),
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        assert_eq!(wrong_password, unknown_user);
        assert_eq!(wrong_password["message"], "Invalid username or password");
    }

    #[tokio::test]
    async fn login_requires_fields() {
        let (status, body) = send(post_json("/login", json!({"username": "   ", "password": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Username and password are required");

        let (status, _) = send(post_json("/login", json!({"username": "admin"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_rejects_non_json_body() {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("username=admin"))
            .unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Request body must be JSON");
    }

    #[tokio::test]
    async fn protected_with_valid_token() {
        let (status, body) = send(get_protected(Some(format!("Bearer {}", fresh_token())))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "admin");
        assert_eq!(body["message"], "Access granted to protected endpoint");
    }

    #[tokio::test]
    async fn protected_scheme_is_case_insensitive() {
        let (status, _) = send(get_protected(Some(format!("bearer {}", fresh_token())))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_without_header() {
        let (status, body) = send(get_protected(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Missing or invalid authorization header");

        let (status, _) = send(get_protected(Some("Token abc".to_string()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_with_expired_token() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let token = JwtService::new(SECRET, Duration::hours(24))
            .unwrap()
            .issue("admin", issued)
            .unwrap();

        let (status, body) = send(get_protected(Some(format!("Bearer {token}")))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token expired or invalid");
        assert_eq!(body["reason"], "token_expired");
    }

    #[tokio::test]
    async fn protected_with_foreign_token() {
        let token = JwtService::new("another-key", Duration::hours(24))
            .unwrap()
            .issue("admin", Utc::now())
            .unwrap();

        let (status, body) = send(get_protected(Some(format!("Bearer {token}")))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["reason"], "invalid_signature");
    }

    #[tokio::test]
    async fn verify_valid_token() {
        let (status, body) = send(post_json("/verify", json!({"token": fresh_token()}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["username"], "admin");
        assert_eq!(
            body["exp"].as_i64().unwrap() - body["iat"].as_i64().unwrap(),
            86_400
        );
    }

    #[tokio::test]
    async fn verify_malformed_token() {
        let (status, body) = send(post_json("/verify", json!({"token": "not.a.token"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["valid"], false);
        assert_eq!(body["reason"], "malformed_token");
    }

    #[tokio::test]
    async fn verify_requires_token() {
        let (status, body) = send(post_json("/verify", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["valid"], false);
        assert_eq!(body["message"], "Token is required");

        let req = HttpRequest::builder()
            .method("POST")
            .uri("/verify")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let (status, _) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_non_string_token_is_rejected() {
        for token in [json!(null), json!(123), json!(["a.b.c"]), json!({"jwt": "a.b.c"})] {
            let (status, body) = send(post_json("/verify", json!({ "token": token }))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "token {token}");
            assert_eq!(body["valid"], false);
            assert_eq!(body["message"], "Token is invalid or expired");
            assert_eq!(body["reason"], "malformed_token");
        }
    }

    #[tokio::test]
    async fn logout_is_no_content() {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/logout")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());
    }
}
