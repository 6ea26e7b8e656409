use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, error};

use super::messages::{
    ChatMessage, CompletionErrorResponse, CompletionRequest, CompletionResponse,
};

/// Errors from the completion client
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key configured; the client refuses to send anything
    #[error("completion API key not configured")]
    MissingApiKey,

    /// Transport-level failure (connect, timeout, TLS)
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status from the completion endpoint
    #[error("completion API returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// 2xx response with no usable choice content
    #[error("completion response contained no choices")]
    EmptyResponse,
}

/// Chat-completion HTTP client
///
/// Wraps a shared `reqwest::Client` so connections are pooled across
/// requests. The endpoint URL is configurable to allow tests to substitute
/// a mock server.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http_client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl LlmClient {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http_client,
            endpoint,
            api_key,
            model,
        }
    }

    /// Issue one completion exchange and return the first choice's text.
    ///
    /// `temperature` is `None` for conversational turns and set explicitly
    /// by the artifact updater, matching the two call sites' needs.
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        temperature: Option<f32>,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "sending completion request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CompletionErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(%status, %message, "completion API error");
            return Err(LlmError::Api { status, message });
        }

        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .first_content()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        debug!(reply_len = content.len(), "completion received");
        Ok(content)
    }
}
