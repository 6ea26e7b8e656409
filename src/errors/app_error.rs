use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application error for the admin JSON endpoints.
///
/// The conversational webhook routes never return these - a failed turn is
/// converted into spoken TwiML instead. The admin surface maps each variant
/// onto a `{error, details}` JSON body with a matching status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body is missing a required field or is otherwise malformed
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A named backup or artifact does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The completion API call failed (transport, non-2xx, malformed body)
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A generated patch failed the content verification step.
    /// Distinct from `Upstream` in the taxonomy, but surfaced with the same
    /// status code so callers see one failure mode for a failed update.
    #[error("patch validation failed: {0}")]
    Validation(String),

    /// Filesystem failure while reading or writing the artifact, a backup,
    /// or the audit log
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The deploy hook POST failed after the artifact was already mutated
    #[error("deploy hook failed: {0}")]
    DeployHook(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_)
            | AppError::Validation(_)
            | AppError::Io(_)
            | AppError::DeployHook(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "Bad request.",
            AppError::NotFound(_) => "Not found.",
            AppError::Upstream(_) | AppError::Validation(_) | AppError::DeployHook(_) => {
                "Update failed."
            }
            AppError::Io(_) => "Internal error.",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.summary(),
            "details": self.to_string(),
        });

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "admin request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "admin request rejected");
        }

        (status, Json(body)).into_response()
    }
}
