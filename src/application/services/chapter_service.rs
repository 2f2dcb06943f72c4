//! Chapter Service - Listing and renaming a story's chapters
//!
//! Chapters are created with their story and never added or removed on
//! their own.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::application::ports::outbound::{ChapterRepositoryPort, StoryRepositoryPort};
use crate::application::services::error::{validate_length, ServiceError};
use crate::application::services::story_service::TITLE_MAX_CHARS;
use crate::domain::entities::Chapter;
use crate::domain::value_objects::{ChapterId, StoryId};

#[async_trait]
pub trait ChapterService: Send + Sync {
    /// Chapters of a story ordered by number
    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<Chapter>, ServiceError>;

    async fn get_chapter(&self, id: ChapterId) -> Result<Option<Chapter>, ServiceError>;

    async fn update_title(&self, id: ChapterId, title: &str) -> Result<Chapter, ServiceError>;
}

pub struct ChapterServiceImpl {
    stories: Arc<dyn StoryRepositoryPort>,
    chapters: Arc<dyn ChapterRepositoryPort>,
}

impl ChapterServiceImpl {
    pub fn new(
        stories: Arc<dyn StoryRepositoryPort>,
        chapters: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self { stories, chapters }
    }
}

#[async_trait]
impl ChapterService for ChapterServiceImpl {
    #[instrument(skip(self))]
    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<Chapter>, ServiceError> {
        if self.stories.get(story_id).await?.is_none() {
            return Err(ServiceError::not_found("Story", story_id));
        }
        Ok(self.chapters.list_by_story(story_id).await?)
    }

    #[instrument(skip(self))]
    async fn get_chapter(&self, id: ChapterId) -> Result<Option<Chapter>, ServiceError> {
        Ok(self.chapters.get(id).await?)
    }

    #[instrument(skip(self), fields(chapter_id = %id))]
    async fn update_title(&self, id: ChapterId, title: &str) -> Result<Chapter, ServiceError> {
        validate_length("Title", title, 1, TITLE_MAX_CHARS)?;

        if !self.chapters.update_title(id, title).await? {
            return Err(ServiceError::not_found("Chapter", id));
        }
        info!(chapter_id = %id, "Renamed chapter");

        self.chapters
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Chapter", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::story_service::{StoryService, StoryServiceImpl};
    use crate::infrastructure::persistence::InMemoryStore;

    #[tokio::test]
    async fn test_rename_chapter() {
        let store = Arc::new(InMemoryStore::new());
        let stories = StoryServiceImpl::new(store.clone(), store.clone(), store.clone(), store.clone());
        let chapters = ChapterServiceImpl::new(store.clone(), store.clone());
        let story = stories.create_story("Saga").await.unwrap();

        let third = chapters.list_chapters(story.id).await.unwrap()[2].clone();
        let renamed = chapters.update_title(third.id, "The Vault").await.unwrap();

        assert_eq!(renamed.title, "The Vault");
        assert_eq!(renamed.number, 3);
        assert!(matches!(
            chapters.update_title(third.id, " ").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_story_and_chapter_are_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let chapters = ChapterServiceImpl::new(store.clone(), store.clone());

        assert!(matches!(
            chapters.list_chapters(StoryId::new()).await,
            Err(ServiceError::NotFound { entity: "Story", .. })
        ));
        assert!(matches!(
            chapters.update_title(ChapterId::new(), "Title").await,
            Err(ServiceError::NotFound { entity: "Chapter", .. })
        ));
    }
}
