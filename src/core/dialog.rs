//! Speech-turn policy
//!
//! Pure classification of a conversational turn, kept free of I/O so the
//! branching rules are unit-testable:
//!
//! 1. `classify_turn` decides what to do with the caller's recognized speech
//!    before any completion call is made (empty input, keyword shortcut, or
//!    forward to the model).
//! 2. `classify_reply` decides what to do with the model's reply (speak it
//!    back, or hand the call to a human operator).
//!
//! The call is a two-state loop: a speech gather at the entry point, one
//! processing pass per turn, and either a loop back to the gather or a
//! terminal dial-out.

/// Canned lines spoken by the gateway
pub mod lines {
    pub const NO_INPUT_APOLOGY: &str =
        "I'm sorry, I didn't catch that. Transferring you to someone now.";
    pub const FAILURE_APOLOGY: &str = "Sorry, there was a problem. Forwarding your call.";
    pub const TRANSFER_NOTICE: &str = "Transferring you now.";
    pub const FOLLOW_UP: &str = "Is there anything else I can help you with?";
    pub const SPRING_QUOTE: &str =
        "A standard spring replacement is $599, including parts and labor.";
}

/// Keyword shortcuts that bypass the completion API entirely.
/// A dispatch table of one entry today; extend by adding rows.
const SHORTCUTS: &[(&str, &str)] = &[("spring", lines::SPRING_QUOTE)];

/// Phrases in a model reply that trigger a handoff to the operator
const TRANSFER_TRIGGERS: &[&str] = &["transfer", "speak to", "talk to someone", "emergency"];

/// What to do with the caller's recognized speech
#[derive(Debug, Clone, PartialEq)]
pub enum TurnInput<'a> {
    /// No usable speech was recognized
    Empty,
    /// A keyword shortcut matched; speak the canned line and loop back to
    /// the entry prompt without consulting the model
    Shortcut(&'static str),
    /// Forward the text to the completion API
    Ask(&'a str),
}

/// What to do with the model's reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyAction {
    /// Speak the reply verbatim and re-prompt for another turn
    Speak,
    /// Announce the handoff and dial the operator
    Transfer,
}

/// Classify the caller's recognized speech for this turn
pub fn classify_turn(speech: &str) -> TurnInput<'_> {
    let trimmed = speech.trim();
    if trimmed.is_empty() {
        return TurnInput::Empty;
    }

    let lowered = trimmed.to_lowercase();
    for (keyword, line) in SHORTCUTS {
        if lowered.contains(keyword) {
            return TurnInput::Shortcut(line);
        }
    }

    TurnInput::Ask(trimmed)
}

/// Classify the model's reply for this turn
pub fn classify_reply(reply: &str) -> ReplyAction {
    let lowered = reply.to_lowercase();
    if TRANSFER_TRIGGERS
        .iter()
        .any(|trigger| lowered.contains(trigger))
    {
        ReplyAction::Transfer
    } else {
        ReplyAction::Speak
    }
}
