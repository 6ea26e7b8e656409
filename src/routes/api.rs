use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, dev, process, voice};
use crate::state::AppState;
use std::sync::Arc;

/// Create the telephony webhook router
///
/// These routes are unauthenticated: the provider posts call events here and
/// cannot attach custom headers.
pub fn create_voice_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/voice", post(voice::inbound_call))
        .route("/process", post(process::speech_turn))
        .layer(TraceLayer::new_for_http())
}

/// Create the admin router
///
/// Note: the shared-secret middleware is applied in main.rs after state is
/// available.
pub fn create_dev_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dev/update-code", post(dev::update_code))
        .route("/dev/rollback", post(dev::rollback))
        .layer(TraceLayer::new_for_http())
}

/// Create the public health check router
pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(api::health_check))
}
