//! Chat-completion API client
//!
//! One synchronous request/response exchange per call. No retries, no
//! streaming - a failed call is reported to the caller, which decides how to
//! degrade (the conversational route transfers to the operator, the admin
//! route returns a 500).

mod client;
mod messages;

pub use client::{LlmClient, LlmError};
pub use messages::{ChatMessage, CompletionRequest, CompletionResponse};
