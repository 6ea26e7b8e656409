use std::sync::Arc;

use axum::extract::State;
use tracing::debug;

use crate::core::twiml::Twiml;
use crate::state::AppState;

/// Inbound call webhook
///
/// Fired by the telephony provider when a call connects. Always succeeds:
/// the response gathers speech from the caller and posts the recognized
/// text back to `/process`. No call state is retained.
pub async fn inbound_call(State(state): State<Arc<AppState>>) -> Twiml {
    debug!("inbound call, issuing entry gather");
    Twiml::with_voice(state.config.say_voice.clone())
        .gather_speech(&state.config.greeting, "/process")
}
