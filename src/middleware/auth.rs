use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::errors::AuthError;
use crate::state::AppState;

/// Constant-time comparison of the presented key against the configured
/// secret, so the check leaks no timing information about prefix matches.
fn api_key_matches(presented: &str, configured: &str) -> bool {
    presented.as_bytes().ct_eq(configured.as_bytes()).into()
}

/// Shared-secret middleware for the `/dev/*` admin endpoints
///
/// The secret is presented in the `x-api-key` header and compared against
/// `DEV_API_KEY`. Any mismatch is a 401, regardless of the request body.
/// The conversational webhook routes are deliberately unauthenticated; the
/// telephony provider cannot attach custom headers.
pub async fn dev_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingApiKey)?;

    if !api_key_matches(presented, &state.config.dev_api_key) {
        tracing::warn!(path = %request.uri().path(), "rejected admin request with bad api key");
        return Err(AuthError::InvalidApiKey);
    }

    tracing::debug!(path = %request.uri().path(), "admin request authenticated");
    Ok(next.run(request).await)
}
