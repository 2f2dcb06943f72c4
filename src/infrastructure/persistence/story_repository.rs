//! Story and chapter repositories for SQLite

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::connection::{parse_id, SqliteConnection};
use crate::application::ports::outbound::{ChapterRepositoryPort, StoryRepositoryPort};
use crate::domain::entities::{Chapter, Story};
use crate::domain::value_objects::{ChapterId, StoryId};

pub struct SqliteStoryRepository {
    connection: SqliteConnection,
}

impl SqliteStoryRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

fn row_to_story(row: &SqliteRow) -> Result<Story> {
    let id: String = row.try_get("id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Story {
        id: parse_id(&id)?,
        title: row.try_get("title")?,
        created_at,
    })
}

#[async_trait]
impl StoryRepositoryPort for SqliteStoryRepository {
    async fn create(&self, story: &Story) -> Result<()> {
        sqlx::query("INSERT INTO stories (id, title, created_at) VALUES (?, ?, ?)")
            .bind(story.id.to_string())
            .bind(&story.title)
            .bind(story.created_at)
            .execute(self.connection.pool())
            .await
            .context("Failed to insert story")?;
        Ok(())
    }

    async fn get(&self, id: StoryId) -> Result<Option<Story>> {
        let row = sqlx::query("SELECT id, title, created_at FROM stories WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.connection.pool())
            .await
            .context("Failed to fetch story")?;
        row.as_ref().map(row_to_story).transpose()
    }

    async fn list(&self) -> Result<Vec<Story>> {
        let rows = sqlx::query("SELECT id, title, created_at FROM stories ORDER BY created_at DESC")
            .fetch_all(self.connection.pool())
            .await
            .context("Failed to list stories")?;
        rows.iter().map(row_to_story).collect()
    }

    async fn update_title(&self, id: StoryId, title: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE stories SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to update story title")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: StoryId) -> Result<()> {
        sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to delete story")?;
        Ok(())
    }
}

pub struct SqliteChapterRepository {
    connection: SqliteConnection,
}

impl SqliteChapterRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

fn row_to_chapter(row: &SqliteRow) -> Result<Chapter> {
    let id: String = row.try_get("id")?;
    let story_id: String = row.try_get("story_id")?;
    let number: i64 = row.try_get("number")?;
    Ok(Chapter {
        id: parse_id(&id)?,
        story_id: parse_id(&story_id)?,
        number: u32::try_from(number).context("Chapter number out of range")?,
        title: row.try_get("title")?,
    })
}

#[async_trait]
impl ChapterRepositoryPort for SqliteChapterRepository {
    async fn create_many(&self, chapters: &[Chapter]) -> Result<()> {
        let mut tx = self
            .connection
            .pool()
            .begin()
            .await
            .context("Failed to start transaction")?;

        for chapter in chapters {
            sqlx::query("INSERT INTO chapters (id, story_id, number, title) VALUES (?, ?, ?, ?)")
                .bind(chapter.id.to_string())
                .bind(chapter.story_id.to_string())
                .bind(i64::from(chapter.number))
                .bind(&chapter.title)
                .execute(&mut *tx)
                .await
                .context("Failed to insert chapter")?;
        }

        tx.commit().await.context("Failed to commit chapters")?;
        Ok(())
    }

    async fn get(&self, id: ChapterId) -> Result<Option<Chapter>> {
        let row = sqlx::query("SELECT id, story_id, number, title FROM chapters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.connection.pool())
            .await
            .context("Failed to fetch chapter")?;
        row.as_ref().map(row_to_chapter).transpose()
    }

    async fn list_by_story(&self, story_id: StoryId) -> Result<Vec<Chapter>> {
        let rows = sqlx::query(
            "SELECT id, story_id, number, title FROM chapters WHERE story_id = ? ORDER BY number",
        )
        .bind(story_id.to_string())
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list chapters")?;
        rows.iter().map(row_to_chapter).collect()
    }

    async fn update_title(&self, id: ChapterId, title: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE chapters SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to update chapter title")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_story(&self, story_id: StoryId) -> Result<()> {
        sqlx::query("DELETE FROM chapters WHERE story_id = ?")
            .bind(story_id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to delete chapters")?;
        Ok(())
    }
}
