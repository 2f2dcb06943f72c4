//! Outbound ports - Interfaces that the application requires from external systems

mod llm_port;
mod queue_port;
mod repository_port;

pub use llm_port::{ChatMessage, LlmPort, LlmRequest, LlmResponse, MessageRole, TokenUsage};
pub use queue_port::{QueueError, QueueItem, QueueItemStatus, QueuePort};
pub use repository_port::{
    ChapterRepositoryPort, CharacterRepositoryPort, GenerationOutcome, SceneRepositoryPort,
    SceneMove, ScenePatch, StoryRepositoryPort,
};
