//! Generation agents
//!
//! The Character Agent turns an outline and the story's cast into TOON
//! guidance; the Scene Writer turns the outline and that guidance into prose.
//! Both talk to the provider only through [`LlmPort`].
//!
//! [`LlmPort`]: crate::application::ports::outbound::LlmPort

mod character_agent;
pub mod prompt_builder;
mod scene_writer;

pub use character_agent::CharacterAgent;
pub use scene_writer::SceneWriter;

/// Default sampling temperature for both agents
pub const AGENT_TEMPERATURE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    /// The provider call failed; carries the provider's message unchanged
    #[error("{0}")]
    Llm(String),
    #[error("Character Agent returned no usable TOON guidance")]
    EmptyGuidance,
}
