use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

/// Liveness check; does not touch Postgres or Redis.
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "UP",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
