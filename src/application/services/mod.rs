//! Application services - Use case implementations
//!
//! Each service accepts port trait objects for its dependencies and returns
//! domain entities. The generation pipeline (agents, orchestrator and queue
//! worker) is generic over the LLM port.

pub mod chapter_service;
pub mod character_service;
pub mod error;
pub mod generation_queue_service;
pub mod generation_service;
pub mod llm;
pub mod scene_service;
pub mod story_service;
pub mod text_generation_service;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ServiceError;

pub use chapter_service::{ChapterService, ChapterServiceImpl};

pub use character_service::{
    CharacterService, CharacterServiceImpl, CreateCharacterRequest, UpdateCharacterRequest,
};

pub use generation_queue_service::GenerationQueueService;
pub use generation_service::GenerationService;

pub use scene_service::{SceneService, SceneServiceImpl, UpdateSceneRequest};

pub use story_service::{StoryService, StoryServiceImpl};

pub use text_generation_service::{TextGenerationService, TextGenerationServiceImpl};
