//! Queue factory - Creates queue instances based on configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::application::dto::GenerationJob;
use crate::application::ports::outbound::QueuePort;
use crate::infrastructure::config::QueueConfig;
use crate::infrastructure::queues::{InMemoryQueue, SqliteQueue};

const GENERATION_QUEUE: &str = "scene_generation";

/// Queue factory for creating queue instances
pub struct QueueFactory {
    config: QueueConfig,
    sqlite_pool: Option<SqlitePool>,
}

impl QueueFactory {
    /// Create a new queue factory, connecting to SQLite when that backend is selected
    pub async fn new(config: QueueConfig) -> Result<Self> {
        let sqlite_pool = if config.backend == "sqlite" {
            if let Some(parent) = std::path::Path::new(&config.sqlite_path).parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create queue database directory")?;
            }

            let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.sqlite_path))
                .await
                .context("Failed to connect to SQLite queue database")?;
            tracing::info!("Connected to SQLite queue database: {}", config.sqlite_path);
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            config,
            sqlite_pool,
        })
    }

    /// Create the scene generation queue
    pub async fn create_generation_queue(&self) -> Result<Arc<dyn QueuePort<GenerationJob>>> {
        match self.config.backend.as_str() {
            "memory" => Ok(Arc::new(InMemoryQueue::<GenerationJob>::new(GENERATION_QUEUE))),
            "sqlite" => {
                let pool = self
                    .sqlite_pool
                    .as_ref()
                    .context("SQLite pool not initialized")?;
                let queue = SqliteQueue::<GenerationJob>::new(pool.clone(), GENERATION_QUEUE)
                    .await
                    .context("Failed to initialize SQLite generation queue")?;
                Ok(Arc::new(queue))
            }
            backend => anyhow::bail!("Unsupported queue backend: {}", backend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SceneId;

    fn config(backend: &str) -> QueueConfig {
        QueueConfig {
            backend: backend.to_string(),
            sqlite_path: String::new(),
            history_retention_hours: 24,
            generation_concurrency: 2,
        }
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let factory = QueueFactory::new(config("memory")).await.unwrap();
        let queue = factory.create_generation_queue().await.unwrap();

        let id = queue.enqueue(GenerationJob::new(SceneId::new(), 1)).await.unwrap();
        assert_eq!(queue.depth().await.unwrap(), 1);
        assert!(queue.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let factory = QueueFactory::new(config("redis")).await.unwrap();
        assert!(factory.create_generation_queue().await.is_err());
    }
}
