//! Shared application state

use std::sync::Arc;

use crate::application::dto::GenerationJob;
use crate::application::ports::outbound::{LlmPort, QueuePort};
use crate::application::services::{
    ChapterService, ChapterServiceImpl, CharacterService, CharacterServiceImpl, SceneService,
    SceneServiceImpl, StoryService, StoryServiceImpl, TextGenerationService,
    TextGenerationServiceImpl,
};
use crate::infrastructure::persistence::Repositories;

/// Shared application state
pub struct AppState {
    pub story_service: Arc<dyn StoryService>,
    pub chapter_service: Arc<dyn ChapterService>,
    pub scene_service: Arc<dyn SceneService>,
    pub character_service: Arc<dyn CharacterService>,
    pub text_generation_service: Arc<dyn TextGenerationService>,
    /// Read by the queue health endpoint
    pub generation_queue: Arc<dyn QueuePort<GenerationJob>>,
}

impl AppState {
    pub fn new<L: LlmPort + 'static>(
        repositories: &Repositories,
        generation_queue: Arc<dyn QueuePort<GenerationJob>>,
        llm: Arc<L>,
    ) -> Self {
        let story_service = StoryServiceImpl::new(
            repositories.stories.clone(),
            repositories.chapters.clone(),
            repositories.scenes.clone(),
            repositories.characters.clone(),
        );
        let chapter_service =
            ChapterServiceImpl::new(repositories.stories.clone(), repositories.chapters.clone());
        let scene_service = SceneServiceImpl::new(
            repositories.scenes.clone(),
            repositories.chapters.clone(),
            generation_queue.clone(),
        );
        let character_service = CharacterServiceImpl::new(
            repositories.stories.clone(),
            repositories.characters.clone(),
        );

        Self {
            story_service: Arc::new(story_service),
            chapter_service: Arc::new(chapter_service),
            scene_service: Arc::new(scene_service),
            character_service: Arc::new(character_service),
            text_generation_service: Arc::new(TextGenerationServiceImpl::new(llm)),
            generation_queue,
        }
    }
}
