//! Scene entity - One outlined unit of a chapter, optionally with generated prose

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{ChapterId, SceneId, SceneStatus, StoryId};

/// A scene - an outline plus the prose generated from it
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: SceneId,
    pub story_id: StoryId,
    pub chapter_id: ChapterId,
    /// 1-based, dense within the chapter
    pub position: u32,
    pub outline: String,
    pub prose: Option<String>,
    pub status: SceneStatus,
    pub error_message: Option<String>,
    /// Number of times generation was requested while prose already existed
    pub regeneration_count: u32,
    /// Monotonic token identifying the latest requested generation run
    pub generation_run: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scene {
    pub fn new(
        story_id: StoryId,
        chapter_id: ChapterId,
        position: u32,
        outline: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SceneId::new(),
            story_id,
            chapter_id,
            position,
            outline: outline.into(),
            prose: None,
            status: SceneStatus::Draft,
            error_message: None,
            regeneration_count: 0,
            generation_run: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_prose(&self) -> bool {
        self.prose.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Start a new generation run with the given outline
    ///
    /// Returns the token of the new run.
    pub fn begin_generation(&mut self, outline: impl Into<String>) -> u64 {
        if self.has_prose() {
            self.regeneration_count += 1;
        }
        self.outline = outline.into();
        self.status = SceneStatus::Generating;
        self.generation_run += 1;
        self.touch();
        self.generation_run
    }

    /// Record the prose of a finished run
    pub fn complete_generation(&mut self, prose: impl Into<String>) {
        self.prose = Some(prose.into());
        self.status = SceneStatus::Complete;
        self.error_message = None;
        self.touch();
    }

    /// Record the failure of a finished run; prose is left as it was
    pub fn fail_generation(&mut self, message: impl Into<String>) {
        self.status = SceneStatus::Error;
        self.error_message = Some(message.into());
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Scene {
        Scene::new(StoryId::new(), ChapterId::new(), 1, "The heist begins")
    }

    #[test]
    fn test_new_scene_is_draft() {
        let scene = draft();
        assert_eq!(scene.status, SceneStatus::Draft);
        assert_eq!(scene.regeneration_count, 0);
        assert_eq!(scene.generation_run, 0);
        assert!(scene.prose.is_none());
    }

    #[test]
    fn test_first_generation_does_not_count_as_regeneration() {
        let mut scene = draft();
        let run = scene.begin_generation("The heist begins at dawn");

        assert_eq!(run, 1);
        assert_eq!(scene.status, SceneStatus::Generating);
        assert_eq!(scene.regeneration_count, 0);
        assert_eq!(scene.outline, "The heist begins at dawn");
    }

    #[test]
    fn test_regeneration_increments_once_per_request() {
        let mut scene = draft();
        scene.begin_generation("v1");
        scene.complete_generation("Some prose.");

        scene.begin_generation("v2");
        assert_eq!(scene.regeneration_count, 1);
        scene.begin_generation("v3");
        assert_eq!(scene.regeneration_count, 2);
        assert_eq!(scene.generation_run, 3);
    }

    #[test]
    fn test_failure_keeps_prose() {
        let mut scene = draft();
        scene.begin_generation("v1");
        scene.complete_generation("Kept prose.");
        scene.begin_generation("v2");
        scene.fail_generation("LLM error: boom");

        assert_eq!(scene.status, SceneStatus::Error);
        assert_eq!(scene.prose.as_deref(), Some("Kept prose."));
        assert_eq!(scene.error_message.as_deref(), Some("LLM error: boom"));

        scene.begin_generation("v3");
        scene.complete_generation("New prose.");
        assert!(scene.error_message.is_none());
    }

    #[test]
    fn test_whitespace_prose_counts_as_existing_prose() {
        let mut scene = draft();
        scene.prose = Some("   ".to_string());
        assert!(scene.has_prose());

        scene.begin_generation("v1");
        assert_eq!(scene.regeneration_count, 1);

        scene.prose = Some(String::new());
        scene.begin_generation("v2");
        assert_eq!(scene.regeneration_count, 1);
    }
}
