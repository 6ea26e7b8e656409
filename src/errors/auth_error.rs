use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Authentication error raised by the admin shared-secret middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `x-api-key` header was supplied
    #[error("missing x-api-key header")]
    MissingApiKey,

    /// The supplied key does not match the configured admin secret
    #[error("invalid api key")]
    InvalidApiKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "admin authentication failed");

        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized request." })),
        )
            .into_response()
    }
}
