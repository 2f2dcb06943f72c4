//! Character Agent - Per-scene voice guidance in TOON form

use std::sync::Arc;

use tracing::{debug, instrument};

use super::prompt_builder::{build_character_agent_prompt, CHARACTER_AGENT_SYSTEM_PROMPT};
use super::{AgentError, AGENT_TEMPERATURE};
use crate::application::ports::outbound::{ChatMessage, LlmPort, LlmRequest};
use crate::domain::entities::Character;
use crate::domain::value_objects::Guidance;

/// TOON responses are compact
pub const CHARACTER_AGENT_MAX_TOKENS: u32 = 500;

pub struct CharacterAgent<L: LlmPort> {
    llm: Arc<L>,
    model: String,
}

impl<L: LlmPort> CharacterAgent<L> {
    pub fn new(llm: Arc<L>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Analyze a scene outline against the whole cast of its story
    ///
    /// Missing required fields are tolerated; only a response with no usable
    /// `key:value` line at all is an error.
    #[instrument(skip(self, outline, characters), fields(cast = characters.len()))]
    pub async fn analyze(
        &self,
        outline: &str,
        characters: &[Character],
    ) -> Result<Guidance, AgentError> {
        let request = LlmRequest::new(vec![ChatMessage::user(build_character_agent_prompt(
            outline, characters,
        ))])
        .with_system_prompt(CHARACTER_AGENT_SYSTEM_PROMPT)
        .with_model(self.model.clone())
        .with_temperature(AGENT_TEMPERATURE)
        .with_max_tokens(CHARACTER_AGENT_MAX_TOKENS);

        let response = self
            .llm
            .generate(request)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        let guidance = Guidance::from_toon(&response.content);
        if guidance.is_empty() {
            return Err(AgentError::EmptyGuidance);
        }

        let missing = guidance.missing_fields();
        if !missing.is_empty() {
            debug!(?missing, "Guidance is missing required fields");
        }
        debug!(
            fields = guidance.len(),
            guidance = %guidance.to_toon(),
            "Character Agent returned guidance"
        );

        Ok(guidance)
    }
}
