//! Document store adapters
//!
//! Two backends implement the repository ports: an in-memory store and a
//! SQLite store. [`Repositories`] bundles whichever backend is configured
//! behind the port traits.

mod character_repository;
mod connection;
mod memory_store;
mod scene_repository;
mod story_repository;

pub use character_repository::SqliteCharacterRepository;
pub use connection::SqliteConnection;
pub use memory_store::InMemoryStore;
pub use scene_repository::SqliteSceneRepository;
pub use story_repository::{SqliteChapterRepository, SqliteStoryRepository};

use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::outbound::{
    ChapterRepositoryPort, CharacterRepositoryPort, SceneRepositoryPort, StoryRepositoryPort,
};
use crate::infrastructure::config::StoreConfig;

/// Combined repository providing access to all domain repositories
#[derive(Clone)]
pub struct Repositories {
    pub stories: Arc<dyn StoryRepositoryPort>,
    pub chapters: Arc<dyn ChapterRepositoryPort>,
    pub scenes: Arc<dyn SceneRepositoryPort>,
    pub characters: Arc<dyn CharacterRepositoryPort>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            stories: store.clone(),
            chapters: store.clone(),
            scenes: store.clone(),
            characters: store,
        }
    }

    pub async fn sqlite(connection: SqliteConnection) -> Result<Self> {
        connection.initialize_schema().await?;
        Ok(Self {
            stories: Arc::new(SqliteStoryRepository::new(connection.clone())),
            chapters: Arc::new(SqliteChapterRepository::new(connection.clone())),
            scenes: Arc::new(SqliteSceneRepository::new(connection.clone())),
            characters: Arc::new(SqliteCharacterRepository::new(connection)),
        })
    }

    /// Build the backend named by `config.backend`
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        match config.backend.as_str() {
            "memory" => {
                tracing::info!("Using in-memory document store");
                Ok(Self::in_memory())
            }
            "sqlite" => Self::sqlite(SqliteConnection::open(&config.sqlite_path).await?).await,
            backend => anyhow::bail!("Unsupported store backend: {}", backend),
        }
    }
}
