use axum::response::Json;
use chrono::Utc;
use serde_json::json;

/// Health check endpoint handler.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/health`
///
/// # Response Format
/// ```json
/// {
///   "success": true,
///   "message": "Authentication Lab Backend is running",
///   "timestamp": "2024-01-01T00:00:00.000000+00:00"
/// }
/// ```
///
/// Always answers 200 while the process is up; it does not touch the token
/// engine or the credential store.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Authentication Lab Backend is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
