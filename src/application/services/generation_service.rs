//! Generation Service - Orchestrates one scene's generation run
//!
//! A run loads the scene and its story's full cast, asks the Character Agent
//! for guidance, hands that to the Scene Writer and persists the prose. Any
//! failure after the scene is loaded is written to the scene as its error
//! message and then returned to the caller.
//!
//! The final write is conditional on the scene's run token: when a newer
//! run was requested in the meantime, this run's result is dropped.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::application::dto::GenerationJob;
use crate::application::ports::outbound::{
    CharacterRepositoryPort, GenerationOutcome, LlmPort, SceneRepositoryPort,
};
use crate::application::services::llm::{AgentError, CharacterAgent, SceneWriter};
use crate::domain::entities::Scene;
use crate::domain::value_objects::{SceneId, SceneStatus};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Scene {0} not found")]
    SceneNotFound(SceneId),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("Failed to persist generation result: {0}")]
    Persistence(String),
}

/// What happened to a finished run's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Prose was written and the scene marked complete
    Completed,
    /// A newer run started; this run's prose was discarded
    Superseded,
}

/// What the worker did with a queued job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Ran(RunOutcome),
    /// The job's run is no longer current or already finished
    Skipped,
}

pub struct GenerationService<L: LlmPort> {
    scenes: Arc<dyn SceneRepositoryPort>,
    characters: Arc<dyn CharacterRepositoryPort>,
    character_agent: CharacterAgent<L>,
    scene_writer: SceneWriter<L>,
}

impl<L: LlmPort> GenerationService<L> {
    pub fn new(
        scenes: Arc<dyn SceneRepositoryPort>,
        characters: Arc<dyn CharacterRepositoryPort>,
        llm: Arc<L>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        Self {
            scenes,
            characters,
            character_agent: CharacterAgent::new(llm.clone(), model.clone()),
            scene_writer: SceneWriter::new(llm, model),
        }
    }

    /// Run the generation pipeline for a scene
    #[instrument(skip_all, fields(scene_id = %scene_id))]
    pub async fn generate(&self, scene_id: SceneId) -> Result<RunOutcome, GenerationError> {
        let scene = self.load_scene(scene_id).await?;
        self.run(scene).await
    }

    /// Run a queued job unless it has been overtaken
    ///
    /// Delivery is at-least-once, so a job whose run already finished, or
    /// was superseded by a newer request, is skipped without calling the model.
    #[instrument(skip(self, job), fields(scene_id = %job.scene_id, run = job.run))]
    pub async fn process_job(&self, job: &GenerationJob) -> Result<JobOutcome, GenerationError> {
        let scene = match self.load_scene(job.scene_id).await {
            Ok(scene) => scene,
            Err(error) => {
                // A scene left `generating` would never be picked up again
                if matches!(error, GenerationError::Persistence(_)) {
                    self.record_failure(job.scene_id, job.run, &error).await;
                }
                return Err(error);
            }
        };

        if scene.generation_run != job.run || scene.status != SceneStatus::Generating {
            info!(
                current_run = scene.generation_run,
                status = %scene.status,
                "Skipping generation job that is no longer current"
            );
            return Ok(JobOutcome::Skipped);
        }

        self.run(scene).await.map(JobOutcome::Ran)
    }

    async fn load_scene(&self, scene_id: SceneId) -> Result<Scene, GenerationError> {
        self.scenes
            .get(scene_id)
            .await
            .map_err(|e| GenerationError::Persistence(format!("{:#}", e)))?
            .ok_or(GenerationError::SceneNotFound(scene_id))
    }

    async fn run(&self, scene: Scene) -> Result<RunOutcome, GenerationError> {
        let run = scene.generation_run;
        info!(run, outline_chars = scene.outline.chars().count(), "Starting scene generation");

        match self.write_prose(&scene).await {
            Ok(prose) => {
                let applied = self
                    .scenes
                    .finish_generation(scene.id, run, GenerationOutcome::Completed { prose })
                    .await;
                match applied {
                    Ok(true) => {
                        info!(run, "Scene generation complete");
                        Ok(RunOutcome::Completed)
                    }
                    Ok(false) => {
                        warn!(run, "Scene generation superseded by a newer run, result dropped");
                        Ok(RunOutcome::Superseded)
                    }
                    Err(e) => {
                        let error = GenerationError::Persistence(format!("{:#}", e));
                        self.record_failure(scene.id, run, &error).await;
                        Err(error)
                    }
                }
            }
            Err(error) => {
                self.record_failure(scene.id, run, &error).await;
                Err(error)
            }
        }
    }

    async fn write_prose(&self, scene: &Scene) -> Result<String, GenerationError> {
        let cast = self
            .characters
            .list_by_story(scene.story_id)
            .await
            .map_err(|e| GenerationError::Persistence(format!("{:#}", e)))?;
        info!(characters = cast.len(), "Loaded story cast");

        let guidance = self.character_agent.analyze(&scene.outline, &cast).await?;
        let prose = self.scene_writer.write(&scene.outline, &guidance).await?;
        Ok(prose)
    }

    async fn record_failure(&self, scene_id: SceneId, run: u64, error: &GenerationError) {
        error!(run, error = %error, "Scene generation failed");

        let outcome = GenerationOutcome::Failed {
            message: error.to_string(),
        };
        match self.scenes.finish_generation(scene_id, run, outcome).await {
            Ok(true) => {}
            Ok(false) => warn!(run, "Scene generation superseded, failure not recorded"),
            Err(e) => error!(run, error = %e, "Failed to record scene generation failure"),
        }
    }
}
