use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "UP".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
