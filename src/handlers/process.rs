use std::sync::Arc;

use axum::extract::State;
use serde::Deserialize;
use tracing::{error, info};

use crate::core::dialog::{self, ReplyAction, TurnInput, lines};
use crate::core::llm::ChatMessage;
use crate::core::twiml::Twiml;
use crate::state::AppState;

/// Speech-result callback body. The provider posts urlencoded form fields;
/// only the recognized text is consumed.
#[derive(Debug, Default, Deserialize)]
pub struct SpeechCallback {
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: Option<String>,
}

/// Speech-result webhook: one conversational turn
///
/// Each turn is stateless - no prior-turn memory is carried. The turn either
/// loops the call back to a speech gather or terminates in a dial-out to the
/// operator; the completion API is consulted only when no shortcut applies.
///
/// The body is parsed leniently instead of through the `Form` extractor: a
/// webhook must answer in TwiML even when the provider sends an unexpected
/// content type, so an unparseable body is treated as a turn with no speech.
pub async fn speech_turn(State(state): State<Arc<AppState>>, body: String) -> Twiml {
    let callback: SpeechCallback = serde_urlencoded::from_str(&body).unwrap_or_default();
    let speech = callback.speech_result.as_deref().unwrap_or("");
    let doc = || Twiml::with_voice(state.config.say_voice.clone());

    match dialog::classify_turn(speech) {
        TurnInput::Empty => {
            info!("no speech recognized, transferring to operator");
            doc()
                .say(lines::NO_INPUT_APOLOGY)
                .dial(&state.config.forward_number)
        }
        TurnInput::Shortcut(line) => {
            info!("keyword shortcut hit, skipping completion call");
            doc().say(line).redirect("/voice")
        }
        TurnInput::Ask(text) => {
            let messages = vec![
                ChatMessage::system(state.config.system_prompt.clone()),
                ChatMessage::user(text),
            ];

            match state.llm.chat(messages, None).await {
                Ok(reply) => match dialog::classify_reply(&reply) {
                    ReplyAction::Transfer => {
                        info!("reply requested transfer, dialing operator");
                        doc()
                            .say(lines::TRANSFER_NOTICE)
                            .dial(&state.config.forward_number)
                    }
                    ReplyAction::Speak => doc()
                        .say(reply)
                        .gather_speech(lines::FOLLOW_UP, "/process"),
                },
                Err(e) => {
                    error!(error = %e, "completion call failed, transferring to operator");
                    doc()
                        .say(lines::FAILURE_APOLOGY)
                        .dial(&state.config.forward_number)
                }
            }
        }
    }
}
