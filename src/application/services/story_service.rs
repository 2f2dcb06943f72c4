//! Story Service - Application service for story management
//!
//! Creating a story also creates its fixed set of numbered chapters.
//! Deleting a story removes everything that hangs off it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::{
    ChapterRepositoryPort, CharacterRepositoryPort, SceneRepositoryPort, StoryRepositoryPort,
};
use crate::application::services::error::{validate_length, ServiceError};
use crate::domain::entities::{Chapter, Story, DEFAULT_CHAPTER_COUNT};
use crate::domain::value_objects::StoryId;

pub const TITLE_MAX_CHARS: usize = 200;

/// Story service trait defining the application use cases
#[async_trait]
pub trait StoryService: Send + Sync {
    /// Create a story together with its chapters
    async fn create_story(&self, title: &str) -> Result<Story, ServiceError>;

    async fn get_story(&self, id: StoryId) -> Result<Option<Story>, ServiceError>;

    /// All stories, newest first
    async fn list_stories(&self) -> Result<Vec<Story>, ServiceError>;

    async fn update_title(&self, id: StoryId, title: &str) -> Result<Story, ServiceError>;

    /// Delete a story with its chapters, scenes and characters
    async fn delete_story(&self, id: StoryId) -> Result<(), ServiceError>;
}

pub struct StoryServiceImpl {
    stories: Arc<dyn StoryRepositoryPort>,
    chapters: Arc<dyn ChapterRepositoryPort>,
    scenes: Arc<dyn SceneRepositoryPort>,
    characters: Arc<dyn CharacterRepositoryPort>,
}

impl StoryServiceImpl {
    pub fn new(
        stories: Arc<dyn StoryRepositoryPort>,
        chapters: Arc<dyn ChapterRepositoryPort>,
        scenes: Arc<dyn SceneRepositoryPort>,
        characters: Arc<dyn CharacterRepositoryPort>,
    ) -> Self {
        Self {
            stories,
            chapters,
            scenes,
            characters,
        }
    }
}

#[async_trait]
impl StoryService for StoryServiceImpl {
    #[instrument(skip(self))]
    async fn create_story(&self, title: &str) -> Result<Story, ServiceError> {
        validate_length("Title", title, 1, TITLE_MAX_CHARS)?;

        let story = Story::new(title);
        self.stories.create(&story).await?;

        let chapters: Vec<Chapter> = (1..=DEFAULT_CHAPTER_COUNT)
            .map(|number| Chapter::numbered(story.id, number))
            .collect();
        self.chapters.create_many(&chapters).await?;

        info!(story_id = %story.id, chapters = chapters.len(), "Created story");
        Ok(story)
    }

    #[instrument(skip(self))]
    async fn get_story(&self, id: StoryId) -> Result<Option<Story>, ServiceError> {
        debug!(story_id = %id, "Fetching story");
        Ok(self.stories.get(id).await?)
    }

    #[instrument(skip(self))]
    async fn list_stories(&self) -> Result<Vec<Story>, ServiceError> {
        Ok(self.stories.list().await?)
    }

    #[instrument(skip(self), fields(story_id = %id))]
    async fn update_title(&self, id: StoryId, title: &str) -> Result<Story, ServiceError> {
        validate_length("Title", title, 1, TITLE_MAX_CHARS)?;

        if !self.stories.update_title(id, title).await? {
            return Err(ServiceError::not_found("Story", id));
        }
        self.stories
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Story", id))
    }

    #[instrument(skip(self), fields(story_id = %id))]
    async fn delete_story(&self, id: StoryId) -> Result<(), ServiceError> {
        if self.stories.get(id).await?.is_none() {
            return Err(ServiceError::not_found("Story", id));
        }

        self.scenes.delete_by_story(id).await?;
        self.characters.delete_by_story(id).await?;
        self.chapters.delete_by_story(id).await?;
        self.stories.delete(id).await?;

        info!(story_id = %id, "Deleted story");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Character, Scene};
    use crate::infrastructure::persistence::InMemoryStore;

    fn service(store: &Arc<InMemoryStore>) -> StoryServiceImpl {
        StoryServiceImpl::new(store.clone(), store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_create_story_creates_numbered_chapters() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store);

        let story = service.create_story("The Long Heist").await.unwrap();

        let chapters = ChapterRepositoryPort::list_by_story(store.as_ref(), story.id)
            .await
            .unwrap();
        assert_eq!(chapters.len(), DEFAULT_CHAPTER_COUNT as usize);
        assert_eq!(chapters[0].number, 1);
        assert_eq!(chapters[0].title, "Chapter 1");
        assert_eq!(chapters[23].title, "Chapter 24");
    }

    #[tokio::test]
    async fn test_title_length_is_validated() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store);

        assert!(matches!(
            service.create_story("").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.create_story(&"x".repeat(201)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(service.create_story(&"x".repeat(200)).await.is_ok());
        assert!(service.list_stories().await.unwrap().len() == 1);
    }

    #[tokio::test]
    async fn test_update_missing_story_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store);

        let error = service.update_title(StoryId::new(), "New").await.unwrap_err();
        assert!(matches!(error, ServiceError::NotFound { entity: "Story", .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(&store);
        let story = service.create_story("Doomed").await.unwrap();
        let chapter = ChapterRepositoryPort::list_by_story(store.as_ref(), story.id)
            .await
            .unwrap()[0]
            .clone();
        let scene = store
            .create_appended(Scene::new(story.id, chapter.id, 1, "Outline"))
            .await
            .unwrap();
        CharacterRepositoryPort::create(store.as_ref(), &Character::new(story.id, "Mira", "Guarded"))
            .await
            .unwrap();

        service.delete_story(story.id).await.unwrap();

        assert!(service.get_story(story.id).await.unwrap().is_none());
        assert!(ChapterRepositoryPort::list_by_story(store.as_ref(), story.id)
            .await
            .unwrap()
            .is_empty());
        assert!(SceneRepositoryPort::get(store.as_ref(), scene.id)
            .await
            .unwrap()
            .is_none());
        assert!(CharacterRepositoryPort::list_by_story(store.as_ref(), story.id)
            .await
            .unwrap()
            .is_empty());
    }
}
