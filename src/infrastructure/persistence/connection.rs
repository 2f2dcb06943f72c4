//! SQLite connection management

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Shared SQLite pool for the document store
#[derive(Clone)]
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    /// Open (creating if needed) the database file at `path`
    pub async fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .context("Invalid SQLite path")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        tracing::info!("Connected to SQLite database: {}", path);
        Ok(Self { pool })
    }

    /// Private in-memory database; one connection so every query sees the same data
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory SQLite database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist
    pub async fn initialize_schema(&self) -> Result<()> {
        let statements = [
            r#"CREATE TABLE IF NOT EXISTS stories (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS chapters (
                id TEXT PRIMARY KEY,
                story_id TEXT NOT NULL,
                number INTEGER NOT NULL,
                title TEXT NOT NULL
            )"#,
            "CREATE INDEX IF NOT EXISTS idx_chapters_story ON chapters(story_id, number)",
            r#"CREATE TABLE IF NOT EXISTS scenes (
                id TEXT PRIMARY KEY,
                story_id TEXT NOT NULL,
                chapter_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                outline TEXT NOT NULL,
                prose TEXT,
                status TEXT NOT NULL,
                error_message TEXT,
                regeneration_count INTEGER NOT NULL DEFAULT 0,
                generation_run INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#,
            "DROP INDEX IF EXISTS idx_scenes_chapter",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_scenes_chapter_position ON scenes(chapter_id, position)",
            "CREATE INDEX IF NOT EXISTS idx_scenes_story ON scenes(story_id)",
            r#"CREATE TABLE IF NOT EXISTS characters (
                id TEXT PRIMARY KEY,
                story_id TEXT NOT NULL,
                name TEXT NOT NULL,
                traits TEXT NOT NULL,
                backstory TEXT,
                created_at TEXT NOT NULL
            )"#,
            "CREATE INDEX IF NOT EXISTS idx_characters_story ON characters(story_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to initialize SQLite schema")?;
        }
        Ok(())
    }
}

/// Parse a stored id column into a typed id
pub(crate) fn parse_id<T: From<Uuid>>(value: &str) -> Result<T> {
    Uuid::parse_str(value)
        .map(T::from)
        .with_context(|| format!("Invalid id stored in database: {}", value))
}
