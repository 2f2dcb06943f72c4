//! In-memory document store
//!
//! Every repository port is implemented over `RwLock`-guarded maps. Each
//! method takes the lock once, so single operations are atomic just like
//! the SQLite adapter's statements and transactions.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::outbound::{
    ChapterRepositoryPort, CharacterRepositoryPort, GenerationOutcome, SceneMove,
    SceneRepositoryPort, ScenePatch, StoryRepositoryPort,
};
use crate::domain::entities::{Chapter, Character, Scene, Story};
use crate::domain::services::scene_ordering::{compact, move_scene, next_position, PositionChange};
use crate::domain::value_objects::{ChapterId, CharacterId, SceneId, StoryId};

#[derive(Default)]
pub struct InMemoryStore {
    stories: RwLock<HashMap<StoryId, Story>>,
    chapters: RwLock<HashMap<ChapterId, Chapter>>,
    scenes: RwLock<HashMap<SceneId, Scene>>,
    characters: RwLock<HashMap<CharacterId, Character>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoryRepositoryPort for InMemoryStore {
    async fn create(&self, story: &Story) -> Result<()> {
        self.stories.write().await.insert(story.id, story.clone());
        Ok(())
    }

    async fn get(&self, id: StoryId) -> Result<Option<Story>> {
        Ok(self.stories.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Story>> {
        let mut stories: Vec<Story> = self.stories.read().await.values().cloned().collect();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    async fn update_title(&self, id: StoryId, title: &str) -> Result<bool> {
        let mut stories = self.stories.write().await;
        match stories.get_mut(&id) {
            Some(story) => {
                story.title = title.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: StoryId) -> Result<()> {
        self.stories.write().await.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ChapterRepositoryPort for InMemoryStore {
    async fn create_many(&self, chapters: &[Chapter]) -> Result<()> {
        let mut map = self.chapters.write().await;
        for chapter in chapters {
            map.insert(chapter.id, chapter.clone());
        }
        Ok(())
    }

    async fn get(&self, id: ChapterId) -> Result<Option<Chapter>> {
        Ok(self.chapters.read().await.get(&id).cloned())
    }

    async fn list_by_story(&self, story_id: StoryId) -> Result<Vec<Chapter>> {
        let mut chapters: Vec<Chapter> = self
            .chapters
            .read()
            .await
            .values()
            .filter(|c| c.story_id == story_id)
            .cloned()
            .collect();
        chapters.sort_by_key(|c| c.number);
        Ok(chapters)
    }

    async fn update_title(&self, id: ChapterId, title: &str) -> Result<bool> {
        let mut chapters = self.chapters.write().await;
        match chapters.get_mut(&id) {
            Some(chapter) => {
                chapter.title = title.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_story(&self, story_id: StoryId) -> Result<()> {
        self.chapters
            .write()
            .await
            .retain(|_, c| c.story_id != story_id);
        Ok(())
    }
}

#[async_trait]
impl SceneRepositoryPort for InMemoryStore {
    async fn create_appended(&self, mut scene: Scene) -> Result<Scene> {
        let mut scenes = self.scenes.write().await;
        let existing = scenes
            .values()
            .filter(|s| s.chapter_id == scene.chapter_id)
            .count();
        scene.position = next_position(existing);
        scenes.insert(scene.id, scene.clone());
        Ok(scene)
    }

    async fn get(&self, id: SceneId) -> Result<Option<Scene>> {
        Ok(self.scenes.read().await.get(&id).cloned())
    }

    async fn list_by_chapter(&self, chapter_id: ChapterId) -> Result<Vec<Scene>> {
        let mut scenes: Vec<Scene> = self
            .scenes
            .read()
            .await
            .values()
            .filter(|s| s.chapter_id == chapter_id)
            .cloned()
            .collect();
        scenes.sort_by_key(|s| s.position);
        Ok(scenes)
    }

    async fn patch(&self, id: SceneId, patch: ScenePatch) -> Result<Option<Scene>> {
        let mut scenes = self.scenes.write().await;
        let Some(scene) = scenes.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(outline) = patch.outline {
            scene.outline = outline;
        }
        if let Some(prose) = patch.prose {
            scene.prose = Some(prose);
        }
        if let Some(status) = patch.status {
            scene.status = status;
        }
        if let Some(message) = patch.error_message {
            scene.error_message = Some(message);
        }
        scene.touch();

        Ok(Some(scene.clone()))
    }

    async fn move_to(&self, id: SceneId, position: u32) -> Result<SceneMove> {
        let mut scenes = self.scenes.write().await;
        let Some(chapter_id) = scenes.get(&id).map(|s| s.chapter_id) else {
            return Ok(SceneMove::NotFound);
        };

        let changes = match move_scene(&siblings(&scenes, chapter_id), id, position) {
            Ok(changes) => changes,
            Err(e) => return Ok(SceneMove::Rejected(e)),
        };
        apply_positions(&mut scenes, &changes);

        Ok(scenes
            .get(&id)
            .cloned()
            .map_or(SceneMove::NotFound, SceneMove::Moved))
    }

    async fn delete(&self, id: SceneId) -> Result<bool> {
        let mut scenes = self.scenes.write().await;
        let Some(removed) = scenes.remove(&id) else {
            return Ok(false);
        };

        let changes = compact(&siblings(&scenes, removed.chapter_id));
        apply_positions(&mut scenes, &changes);
        Ok(true)
    }

    async fn delete_by_story(&self, story_id: StoryId) -> Result<()> {
        self.scenes
            .write()
            .await
            .retain(|_, s| s.story_id != story_id);
        Ok(())
    }

    async fn begin_generation(&self, id: SceneId, outline: &str) -> Result<Option<Scene>> {
        let mut scenes = self.scenes.write().await;
        Ok(scenes.get_mut(&id).map(|scene| {
            scene.begin_generation(outline);
            scene.clone()
        }))
    }

    async fn finish_generation(
        &self,
        id: SceneId,
        run: u64,
        outcome: GenerationOutcome,
    ) -> Result<bool> {
        let mut scenes = self.scenes.write().await;
        let Some(scene) = scenes.get_mut(&id) else {
            return Ok(false);
        };
        if scene.generation_run != run {
            return Ok(false);
        }

        match outcome {
            GenerationOutcome::Completed { prose } => scene.complete_generation(prose),
            GenerationOutcome::Failed { message } => scene.fail_generation(message),
        }
        Ok(true)
    }
}

fn siblings(scenes: &HashMap<SceneId, Scene>, chapter_id: ChapterId) -> Vec<Scene> {
    scenes
        .values()
        .filter(|s| s.chapter_id == chapter_id)
        .cloned()
        .collect()
}

fn apply_positions(scenes: &mut HashMap<SceneId, Scene>, changes: &[PositionChange]) {
    let now = Utc::now();
    for change in changes {
        if let Some(scene) = scenes.get_mut(&change.scene_id) {
            scene.position = change.position;
            scene.updated_at = now;
        }
    }
}

#[async_trait]
impl CharacterRepositoryPort for InMemoryStore {
    async fn create(&self, character: &Character) -> Result<()> {
        self.characters
            .write()
            .await
            .insert(character.id, character.clone());
        Ok(())
    }

    async fn get(&self, id: CharacterId) -> Result<Option<Character>> {
        Ok(self.characters.read().await.get(&id).cloned())
    }

    async fn list_by_story(&self, story_id: StoryId) -> Result<Vec<Character>> {
        let mut characters: Vec<Character> = self
            .characters
            .read()
            .await
            .values()
            .filter(|c| c.story_id == story_id)
            .cloned()
            .collect();
        characters.sort_by_key(|c| c.created_at);
        Ok(characters)
    }

    async fn update(&self, character: &Character) -> Result<()> {
        self.characters
            .write()
            .await
            .insert(character.id, character.clone());
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<()> {
        self.characters.write().await.remove(&id);
        Ok(())
    }

    async fn delete_by_story(&self, story_id: StoryId) -> Result<()> {
        self.characters
            .write()
            .await
            .retain(|_, c| c.story_id != story_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SceneStatus;

    async fn store_with_scene() -> (InMemoryStore, Scene) {
        let store = InMemoryStore::new();
        let scene = store
            .create_appended(Scene::new(StoryId::new(), ChapterId::new(), 1, "Opening"))
            .await
            .unwrap();
        (store, scene)
    }

    #[tokio::test]
    async fn test_stale_run_does_not_overwrite() {
        let (store, scene) = store_with_scene().await;

        let first = store.begin_generation(scene.id, "v1").await.unwrap().unwrap();
        let second = store.begin_generation(scene.id, "v2").await.unwrap().unwrap();
        assert_eq!(second.generation_run, first.generation_run + 1);

        let applied = store
            .finish_generation(
                scene.id,
                first.generation_run,
                GenerationOutcome::Completed { prose: "old".to_string() },
            )
            .await
            .unwrap();
        assert!(!applied);

        let applied = store
            .finish_generation(
                scene.id,
                second.generation_run,
                GenerationOutcome::Completed { prose: "new".to_string() },
            )
            .await
            .unwrap();
        assert!(applied);

        let stored = SceneRepositoryPort::get(&store, scene.id).await.unwrap().unwrap();
        assert_eq!(stored.prose.as_deref(), Some("new"));
        assert_eq!(stored.status, SceneStatus::Complete);
    }

    #[tokio::test]
    async fn test_begin_generation_missing_scene() {
        let store = InMemoryStore::new();
        assert!(store
            .begin_generation(SceneId::new(), "outline")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_patch_leaves_unset_fields() {
        let (store, scene) = store_with_scene().await;

        let patched = store
            .patch(
                scene.id,
                ScenePatch {
                    prose: Some("Hand-written prose".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(patched.outline, "Opening");
        assert_eq!(patched.prose.as_deref(), Some("Hand-written prose"));
        assert_eq!(patched.status, SceneStatus::Draft);
    }

    #[tokio::test]
    async fn test_stories_listed_newest_first() {
        let store = InMemoryStore::new();
        let mut older = Story::new("Older");
        older.created_at = Utc::now() - chrono::Duration::minutes(5);
        let newer = Story::new("Newer");
        StoryRepositoryPort::create(&store, &older).await.unwrap();
        StoryRepositoryPort::create(&store, &newer).await.unwrap();

        let titles: Vec<String> = store.list().await.unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn test_create_appended_ignores_given_position() {
        let store = InMemoryStore::new();
        let chapter_id = ChapterId::new();
        let story_id = StoryId::new();

        let first = store
            .create_appended(Scene::new(story_id, chapter_id, 7, "A"))
            .await
            .unwrap();
        let second = store
            .create_appended(Scene::new(story_id, chapter_id, 7, "B"))
            .await
            .unwrap();
        let elsewhere = store
            .create_appended(Scene::new(story_id, ChapterId::new(), 7, "C"))
            .await
            .unwrap();

        assert_eq!(first.position, 1);
        assert_eq!(second.position, 2);
        assert_eq!(elsewhere.position, 1);
    }

    #[tokio::test]
    async fn test_move_and_delete_keep_positions_dense() {
        let store = InMemoryStore::new();
        let chapter_id = ChapterId::new();
        let story_id = StoryId::new();
        let mut ids = Vec::new();
        for outline in ["A", "B", "C"] {
            let scene = store
                .create_appended(Scene::new(story_id, chapter_id, 0, outline))
                .await
                .unwrap();
            ids.push(scene.id);
        }

        match store.move_to(ids[0], 3).await.unwrap() {
            SceneMove::Moved(scene) => assert_eq!(scene.position, 3),
            other => panic!("unexpected move result: {:?}", other),
        }
        assert!(matches!(
            store.move_to(ids[0], 4).await.unwrap(),
            SceneMove::Rejected(_)
        ));
        assert!(matches!(
            store.move_to(SceneId::new(), 1).await.unwrap(),
            SceneMove::NotFound
        ));

        assert!(SceneRepositoryPort::delete(&store, ids[1]).await.unwrap());
        assert!(!SceneRepositoryPort::delete(&store, ids[1]).await.unwrap());

        let remaining: Vec<(String, u32)> = store
            .list_by_chapter(chapter_id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.outline, s.position))
            .collect();
        assert_eq!(
            remaining,
            vec![("C".to_string(), 1), ("A".to_string(), 2)]
        );
    }
}
