//! Repository ports - Interfaces for data persistence
//!
//! These traits define the contracts that infrastructure repositories must implement.
//! Application services depend on these traits, not concrete implementations.
//! Every method is a single atomic operation; sequences of calls are not
//! transactional. Operations that renumber scenes do so inside that one
//! operation so positions stay dense under concurrent requests.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::{Chapter, Character, Scene, Story};
use crate::domain::services::scene_ordering::OrderingError;
use crate::domain::value_objects::{ChapterId, CharacterId, SceneId, SceneStatus, StoryId};

// =============================================================================
// Story Repository Port
// =============================================================================

#[async_trait]
pub trait StoryRepositoryPort: Send + Sync {
    async fn create(&self, story: &Story) -> Result<()>;

    async fn get(&self, id: StoryId) -> Result<Option<Story>>;

    /// All stories, newest first
    async fn list(&self) -> Result<Vec<Story>>;

    /// Returns false when the story does not exist
    async fn update_title(&self, id: StoryId, title: &str) -> Result<bool>;

    async fn delete(&self, id: StoryId) -> Result<()>;
}

// =============================================================================
// Chapter Repository Port
// =============================================================================

#[async_trait]
pub trait ChapterRepositoryPort: Send + Sync {
    async fn create_many(&self, chapters: &[Chapter]) -> Result<()>;

    async fn get(&self, id: ChapterId) -> Result<Option<Chapter>>;

    /// Chapters of a story ordered by chapter number
    async fn list_by_story(&self, story_id: StoryId) -> Result<Vec<Chapter>>;

    /// Returns false when the chapter does not exist
    async fn update_title(&self, id: ChapterId, title: &str) -> Result<bool>;

    async fn delete_by_story(&self, story_id: StoryId) -> Result<()>;
}

// =============================================================================
// Scene Repository Port
// =============================================================================

/// Partial update of a scene; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenePatch {
    pub outline: Option<String>,
    pub prose: Option<String>,
    pub status: Option<SceneStatus>,
    pub error_message: Option<String>,
}

/// Result of moving a scene within its chapter
#[derive(Debug, Clone, PartialEq)]
pub enum SceneMove {
    Moved(Scene),
    NotFound,
    Rejected(OrderingError),
}

/// Final result of a generation run
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed { prose: String },
    Failed { message: String },
}

#[async_trait]
pub trait SceneRepositoryPort: Send + Sync {
    /// Store the scene at the end of its chapter, ignoring `scene.position`.
    /// Returns the scene with the position it was given.
    async fn create_appended(&self, scene: Scene) -> Result<Scene>;

    async fn get(&self, id: SceneId) -> Result<Option<Scene>>;

    /// Scenes of a chapter ordered by position
    async fn list_by_chapter(&self, chapter_id: ChapterId) -> Result<Vec<Scene>>;

    /// Apply a partial update, returning the updated scene if it exists
    async fn patch(&self, id: SceneId, patch: ScenePatch) -> Result<Option<Scene>>;

    /// Move a scene to a 1-based position, shifting its siblings
    async fn move_to(&self, id: SceneId, position: u32) -> Result<SceneMove>;

    /// Delete a scene and renumber the rest of its chapter.
    /// Returns false when the scene does not exist.
    async fn delete(&self, id: SceneId) -> Result<bool>;

    async fn delete_by_story(&self, story_id: StoryId) -> Result<()>;

    /// Atomically store the new outline, mark the scene `generating`, bump the
    /// regeneration counter if prose already exists and start a new run.
    async fn begin_generation(&self, id: SceneId, outline: &str) -> Result<Option<Scene>>;

    /// Write the outcome of run `run`. A no-op returning false when a newer
    /// run has started since or the scene is gone.
    async fn finish_generation(
        &self,
        id: SceneId,
        run: u64,
        outcome: GenerationOutcome,
    ) -> Result<bool>;
}

// =============================================================================
// Character Repository Port
// =============================================================================

#[async_trait]
pub trait CharacterRepositoryPort: Send + Sync {
    async fn create(&self, character: &Character) -> Result<()>;

    async fn get(&self, id: CharacterId) -> Result<Option<Character>>;

    /// Every character of a story, in creation order
    async fn list_by_story(&self, story_id: StoryId) -> Result<Vec<Character>>;

    async fn update(&self, character: &Character) -> Result<()>;

    async fn delete(&self, id: CharacterId) -> Result<()>;

    async fn delete_by_story(&self, story_id: StoryId) -> Result<()>;
}
