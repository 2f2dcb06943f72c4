//! Scene Service - Application service for scene management
//!
//! Covers outline editing, ordering within a chapter, and the request side
//! of prose generation: a request stores the outline, marks the scene
//! `generating` and queues a job for the generation worker. It never waits
//! for the run itself.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};

use crate::application::dto::GenerationJob;
use crate::application::ports::outbound::{
    ChapterRepositoryPort, GenerationOutcome, QueuePort, SceneMove, SceneRepositoryPort,
    ScenePatch,
};
use crate::application::services::error::{validate_length, ServiceError};
use crate::domain::entities::Scene;
use crate::domain::value_objects::{ChapterId, SceneId, SceneStatus};

pub const OUTLINE_MAX_CHARS: usize = 2000;

/// Request to edit a scene; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateSceneRequest {
    pub outline: Option<String>,
    pub prose: Option<String>,
}

/// Scene service trait defining the application use cases
#[async_trait]
pub trait SceneService: Send + Sync {
    /// Append a new draft scene to a chapter
    async fn create_scene(&self, chapter_id: ChapterId, outline: &str) -> Result<Scene, ServiceError>;

    async fn get_scene(&self, id: SceneId) -> Result<Option<Scene>, ServiceError>;

    /// Scenes of a chapter ordered by position
    async fn list_scenes(&self, chapter_id: ChapterId) -> Result<Vec<Scene>, ServiceError>;

    async fn update_scene(&self, id: SceneId, request: UpdateSceneRequest) -> Result<Scene, ServiceError>;

    /// Delete a scene and close the gap it leaves
    async fn delete_scene(&self, id: SceneId) -> Result<(), ServiceError>;

    /// Move a scene to a 1-based position within its chapter
    async fn move_scene(&self, id: SceneId, position: u32) -> Result<Scene, ServiceError>;

    async fn set_status(
        &self,
        id: SceneId,
        status: SceneStatus,
        error_message: Option<String>,
    ) -> Result<Scene, ServiceError>;

    /// Save the outline, mark the scene generating and queue a generation run
    async fn request_generation(&self, id: SceneId, outline: &str) -> Result<Scene, ServiceError>;
}

pub struct SceneServiceImpl {
    scenes: Arc<dyn SceneRepositoryPort>,
    chapters: Arc<dyn ChapterRepositoryPort>,
    queue: Arc<dyn QueuePort<GenerationJob>>,
}

impl SceneServiceImpl {
    pub fn new(
        scenes: Arc<dyn SceneRepositoryPort>,
        chapters: Arc<dyn ChapterRepositoryPort>,
        queue: Arc<dyn QueuePort<GenerationJob>>,
    ) -> Self {
        Self {
            scenes,
            chapters,
            queue,
        }
    }

    fn validate_outline(outline: &str) -> Result<(), ServiceError> {
        validate_length("Scene outline", outline, 1, OUTLINE_MAX_CHARS)
    }
}

#[async_trait]
impl SceneService for SceneServiceImpl {
    #[instrument(skip(self, outline), fields(chapter_id = %chapter_id))]
    async fn create_scene(&self, chapter_id: ChapterId, outline: &str) -> Result<Scene, ServiceError> {
        Self::validate_outline(outline)?;

        let chapter = self
            .chapters
            .get(chapter_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Chapter", chapter_id))?;

        let scene = self
            .scenes
            .create_appended(Scene::new(chapter.story_id, chapter_id, 0, outline))
            .await?;

        info!(scene_id = %scene.id, position = scene.position, "Created scene");
        Ok(scene)
    }

    #[instrument(skip(self))]
    async fn get_scene(&self, id: SceneId) -> Result<Option<Scene>, ServiceError> {
        debug!(scene_id = %id, "Fetching scene");
        Ok(self.scenes.get(id).await?)
    }

    #[instrument(skip(self))]
    async fn list_scenes(&self, chapter_id: ChapterId) -> Result<Vec<Scene>, ServiceError> {
        if self.chapters.get(chapter_id).await?.is_none() {
            return Err(ServiceError::not_found("Chapter", chapter_id));
        }
        Ok(self.scenes.list_by_chapter(chapter_id).await?)
    }

    #[instrument(skip(self, request), fields(scene_id = %id))]
    async fn update_scene(&self, id: SceneId, request: UpdateSceneRequest) -> Result<Scene, ServiceError> {
        if let Some(ref outline) = request.outline {
            Self::validate_outline(outline)?;
        }

        let patch = ScenePatch {
            outline: request.outline,
            prose: request.prose,
            ..Default::default()
        };
        self.scenes
            .patch(id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Scene", id))
    }

    #[instrument(skip(self), fields(scene_id = %id))]
    async fn delete_scene(&self, id: SceneId) -> Result<(), ServiceError> {
        if !self.scenes.delete(id).await? {
            return Err(ServiceError::not_found("Scene", id));
        }

        info!(scene_id = %id, "Deleted scene");
        Ok(())
    }

    #[instrument(skip(self), fields(scene_id = %id))]
    async fn move_scene(&self, id: SceneId, position: u32) -> Result<Scene, ServiceError> {
        match self.scenes.move_to(id, position).await? {
            SceneMove::Moved(scene) => Ok(scene),
            SceneMove::NotFound => Err(ServiceError::not_found("Scene", id)),
            SceneMove::Rejected(e) => Err(ServiceError::validation(e.to_string())),
        }
    }

    #[instrument(skip(self, error_message), fields(scene_id = %id))]
    async fn set_status(
        &self,
        id: SceneId,
        status: SceneStatus,
        error_message: Option<String>,
    ) -> Result<Scene, ServiceError> {
        let patch = ScenePatch {
            status: Some(status),
            error_message,
            ..Default::default()
        };
        self.scenes
            .patch(id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Scene", id))
    }

    #[instrument(skip(self, outline), fields(scene_id = %id))]
    async fn request_generation(&self, id: SceneId, outline: &str) -> Result<Scene, ServiceError> {
        Self::validate_outline(outline)?;

        let scene = self
            .scenes
            .begin_generation(id, outline)
            .await?
            .ok_or_else(|| ServiceError::not_found("Scene", id))?;

        let job = GenerationJob::new(id, scene.generation_run);
        if let Err(e) = self.queue.enqueue(job).await {
            error!(error = %e, "Failed to queue scene generation");
            let error = ServiceError::Queue(e.to_string());
            let outcome = GenerationOutcome::Failed {
                message: error.to_string(),
            };
            self.scenes
                .finish_generation(id, scene.generation_run, outcome)
                .await?;
            return Err(error);
        }

        info!(
            run = scene.generation_run,
            regeneration_count = scene.regeneration_count,
            "Queued scene generation"
        );
        Ok(scene)
    }
}
