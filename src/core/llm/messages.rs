//! Wire types for the chat-completion API

use serde::{Deserialize, Serialize};

/// A single message in the completion exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the completion endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response body from the completion endpoint.
/// Only the fields the gateway reads are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

impl CompletionResponse {
    /// First choice's text, the only part of the reply the gateway uses
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Error body the completion API returns on non-2xx status
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionErrorResponse {
    pub error: CompletionErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionErrorDetail {
    pub message: String,
}
