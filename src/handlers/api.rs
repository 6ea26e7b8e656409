use axum::Json;
use serde_json::{Value, json};

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "service": "callflow-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
