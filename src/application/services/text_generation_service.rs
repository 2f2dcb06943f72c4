//! Text Generation Service - Free-form prompts and provider connection checks
//!
//! Provider failures are returned in the response body with
//! `success: false` instead of as an error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::application::dto::{
    ConnectionTestResponseDto, GenerateTextRequestDto, GenerateTextResponseDto,
};
use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest};

pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

pub const CONNECTION_TEST_PROMPT: &str =
    "Say \"OpenRouter integration successful\" in one sentence.";
pub const CONNECTION_TEST_MAX_TOKENS: u32 = 50;

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Run a single free-form prompt against the configured model
    async fn generate_text(&self, request: GenerateTextRequestDto) -> GenerateTextResponseDto;

    /// Send a tiny fixed prompt to check the provider is reachable
    async fn test_connection(&self) -> ConnectionTestResponseDto;
}

pub struct TextGenerationServiceImpl<L: LlmPort> {
    llm: Arc<L>,
}

impl<L: LlmPort> TextGenerationServiceImpl<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl<L: LlmPort + 'static> TextGenerationService for TextGenerationServiceImpl<L> {
    #[instrument(skip_all, fields(prompt_chars = request.prompt.chars().count()))]
    async fn generate_text(&self, request: GenerateTextRequestDto) -> GenerateTextResponseDto {
        let mut llm_request = LlmRequest::new(vec![ChatMessage::user(request.prompt)])
            .with_temperature(request.temperature.unwrap_or(DEFAULT_TEMPERATURE))
            .with_max_tokens(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS));
        if let Some(system_prompt) = request.system_prompt {
            llm_request = llm_request.with_system_prompt(system_prompt);
        }

        match self.llm.generate(llm_request).await {
            Ok(response) => {
                info!(tokens = response.usage.total(), "Generated text");
                GenerateTextResponseDto::ok(response.content, response.usage)
            }
            Err(e) => {
                warn!(error = %e, "Text generation failed");
                GenerateTextResponseDto::failed(e.to_string())
            }
        }
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> ConnectionTestResponseDto {
        let request = LlmRequest::new(vec![ChatMessage::user(CONNECTION_TEST_PROMPT)])
            .with_max_tokens(CONNECTION_TEST_MAX_TOKENS);

        match self.llm.generate(request).await {
            Ok(response) => {
                info!(model = %response.model, "Provider connection test succeeded");
                ConnectionTestResponseDto::ok(response.content, response.usage.total())
            }
            Err(e) => {
                warn!(error = %e, "Provider connection test failed");
                ConnectionTestResponseDto::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::TokenUsage;
    use crate::application::services::testing::ScriptedLlm;

    #[tokio::test]
    async fn test_generate_text_applies_defaults() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok("Once upon a time.".to_string())]));
        let service = TextGenerationServiceImpl::new(llm.clone());

        let response = service
            .generate_text(GenerateTextRequestDto {
                prompt: "Begin a fairy tale".to_string(),
                system_prompt: Some("You are a storyteller.".to_string()),
                temperature: None,
                max_tokens: None,
            })
            .await;

        assert_eq!(
            response,
            GenerateTextResponseDto::ok(
                "Once upon a time.".to_string(),
                TokenUsage {
                    prompt_tokens: 12,
                    completion_tokens: 30
                }
            )
        );
        let request = &llm.requests()[0];
        assert_eq!(request.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(request.max_tokens, Some(DEFAULT_MAX_TOKENS));
        assert_eq!(request.system_prompt.as_deref(), Some("You are a storyteller."));
    }

    #[tokio::test]
    async fn test_generate_text_failure_in_body() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(
            "OPENROUTER_API_KEY is not configured".to_string()
        )]));
        let service = TextGenerationServiceImpl::new(llm);

        let response = service
            .generate_text(GenerateTextRequestDto {
                prompt: "Hi".to_string(),
                system_prompt: None,
                temperature: Some(0.2),
                max_tokens: Some(10),
            })
            .await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("OPENROUTER_API_KEY is not configured"));
    }

    #[tokio::test]
    async fn test_connection_reports_total_tokens() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(
            "OpenRouter integration successful.".to_string()
        )]));
        let service = TextGenerationServiceImpl::new(llm.clone());

        let response = service.test_connection().await;

        assert_eq!(
            response,
            ConnectionTestResponseDto::ok("OpenRouter integration successful.".to_string(), 42)
        );
        let request = &llm.requests()[0];
        assert_eq!(request.messages[0].content, CONNECTION_TEST_PROMPT);
        assert_eq!(request.max_tokens, Some(CONNECTION_TEST_MAX_TOKENS));
    }
}
