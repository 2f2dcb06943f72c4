//! Scene Writer Agent - Outline plus guidance to prose

use std::sync::Arc;

use tracing::{debug, instrument};

use super::prompt_builder::{build_scene_writer_prompt, SCENE_WRITER_SYSTEM_PROMPT};
use super::{AgentError, AGENT_TEMPERATURE};
use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest};
use crate::domain::value_objects::Guidance;

/// Room for 300-500 words
pub const SCENE_WRITER_MAX_TOKENS: u32 = 700;

pub struct SceneWriter<L: LlmPort> {
    llm: Arc<L>,
    model: String,
}

impl<L: LlmPort> SceneWriter<L> {
    pub fn new(llm: Arc<L>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Write prose for the outline; the model's text is returned as-is
    #[instrument(skip_all, fields(guidance_fields = guidance.len()))]
    pub async fn write(&self, outline: &str, guidance: &Guidance) -> Result<String, AgentError> {
        let request = LlmRequest::new(vec![ChatMessage::user(build_scene_writer_prompt(
            outline, guidance,
        ))])
        .with_system_prompt(SCENE_WRITER_SYSTEM_PROMPT)
        .with_model(self.model.clone())
        .with_temperature(AGENT_TEMPERATURE)
        .with_max_tokens(SCENE_WRITER_MAX_TOKENS);

        let response = self
            .llm
            .generate(request)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        debug!(
            words = response.content.split_whitespace().count(),
            completion_tokens = response.usage.completion_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "Scene Writer returned prose"
        );
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::ScriptedLlm;

    #[tokio::test]
    async fn test_prose_is_returned_unmodified() {
        let prose = "  The door gave way.\n\nMira stepped through.  ".to_string();
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(prose.clone())]));
        let writer = SceneWriter::new(llm.clone(), "test-model");
        let guidance = Guidance::from_toon("emotional:anxious\npov:first-limited");

        let written = writer.write("The vault door opens", &guidance).await.unwrap();
        assert_eq!(written, prose);

        let request = &llm.requests()[0];
        assert_eq!(request.max_tokens, Some(SCENE_WRITER_MAX_TOKENS));
        let prompt = &request.messages[0].content;
        assert!(prompt.contains("The vault door opens"));
        assert!(prompt.contains("- Emotional: anxious"));
        assert!(prompt.contains("- Physical: N/A"));
    }
}
