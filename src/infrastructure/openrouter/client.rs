//! OpenRouter client with bounded retries
//!
//! Rate limiting (429) and transport failures are retried with exponential
//! backoff; every other HTTP error and any authentication failure ends the
//! call immediately.

use async_trait::async_trait;

use super::retry::{with_retry, RetryDecision, RetryError, RetryPolicy};
use super::transport::{ChatTransport, ReqwestTransport, TransportError};
use super::wire::{ChatCompletionRequest, ChatCompletionResponse};
use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest, LlmResponse, MessageRole};
use crate::infrastructure::config::LlmConfig;

const RATE_LIMITED: u16 = 429;

/// Errors from the OpenRouter client
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("OPENROUTER_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("OpenRouter authentication failed: {0}")]
    Unauthorized(String),
    #[error("OpenRouter API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid OpenRouter response: {0}")]
    InvalidResponse(String),
    #[error("No content in OpenRouter response")]
    EmptyResponse,
    #[error("Failed to call OpenRouter API after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<LlmError> },
}

impl LlmError {
    fn from_transport(error: TransportError) -> Self {
        let message = error.0;
        if message.contains("401") || message.contains("Unauthorized") {
            Self::Unauthorized(message)
        } else {
            Self::Network(message)
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == RATE_LIMITED)
    }

    /// Retry classification used by the client's policy
    pub fn retry_decision(&self) -> RetryDecision {
        match self {
            Self::Api { .. } if self.is_rate_limited() => RetryDecision::Retry,
            Self::Network(_) | Self::InvalidResponse(_) => RetryDecision::Retry,
            _ => RetryDecision::Fail,
        }
    }
}

/// Render an error body compactly, keeping JSON structure when there is one
fn render_error_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Client for the OpenRouter chat-completions API
pub struct OpenRouterClient<T = ReqwestTransport> {
    transport: T,
    api_key: Option<String>,
    default_model: String,
    max_retries: u32,
}

impl OpenRouterClient {
    /// Build the production client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(
            &config.base_url,
            config.referer.clone(),
            config.title.clone(),
            config.request_timeout,
        )?;
        Ok(Self::with_parts(
            transport,
            config.api_key.clone(),
            config.model.clone(),
            config.max_retries,
        ))
    }
}

impl<T: ChatTransport> OpenRouterClient<T> {
    pub fn with_parts(
        transport: T,
        api_key: Option<String>,
        default_model: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            transport,
            api_key,
            default_model: default_model.into(),
            max_retries,
        }
    }

    /// POST `request`, retrying rate limits and transport failures
    ///
    /// `max_retries` is the total number of attempts; the delay before
    /// attempt `i + 1` is `2^i` seconds.
    pub async fn call(
        &self,
        request: &ChatCompletionRequest,
        max_retries: u32,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let policy = RetryPolicy::new(max_retries, LlmError::retry_decision);

        with_retry(&policy, |attempt| async move {
            self.attempt(api_key, request, attempt).await
        })
        .await
        .map_err(|error| match error {
            RetryError::Fatal(e) => e,
            RetryError::Exhausted { attempts, last } => LlmError::RetriesExhausted {
                attempts,
                last: Box::new(last),
            },
        })
    }

    async fn attempt(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
        attempt: u32,
    ) -> Result<ChatCompletionResponse, LlmError> {
        tracing::debug!(
            attempt = attempt + 1,
            model = %request.model,
            messages = request.messages.len(),
            "Calling OpenRouter"
        );

        let response = self
            .transport
            .post_chat(api_key, request)
            .await
            .map_err(LlmError::from_transport)?;

        if !response.is_success() {
            return Err(LlmError::Api {
                status: response.status,
                body: render_error_body(&response.body),
            });
        }

        serde_json::from_str(&response.body).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    fn build_request(&self, request: LlmRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system_prompt) = request.system_prompt {
            messages.push(ChatMessage {
                role: MessageRole::System,
                content: system_prompt,
            });
        }
        messages.extend(request.messages);

        ChatCompletionRequest {
            model: request.model.unwrap_or_else(|| self.default_model.clone()),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl<T: ChatTransport> LlmPort for OpenRouterClient<T> {
    type Error = LlmError;

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, Self::Error> {
        let wire = self.build_request(request);
        let response = self.call(&wire, self.max_retries).await?;

        let content = response
            .first_content()
            .ok_or(LlmError::EmptyResponse)?
            .to_string();
        let usage = response.token_usage();

        tracing::debug!(
            id = %response.id,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "OpenRouter call succeeded"
        );

        Ok(LlmResponse {
            content,
            model: response.model.clone().unwrap_or(wire.model),
            finish_reason: response.choices.first().and_then(|c| c.finish_reason.clone()),
            usage,
        })
    }
}
