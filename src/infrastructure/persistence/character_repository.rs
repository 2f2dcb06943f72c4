//! Character repository implementation for SQLite

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::connection::{parse_id, SqliteConnection};
use crate::application::ports::outbound::CharacterRepositoryPort;
use crate::domain::entities::Character;
use crate::domain::value_objects::{CharacterId, StoryId};

/// Repository for Character operations
pub struct SqliteCharacterRepository {
    connection: SqliteConnection,
}

impl SqliteCharacterRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

fn row_to_character(row: &SqliteRow) -> Result<Character> {
    let id: String = row.try_get("id")?;
    let story_id: String = row.try_get("story_id")?;
    Ok(Character {
        id: parse_id(&id)?,
        story_id: parse_id(&story_id)?,
        name: row.try_get("name")?,
        traits: row.try_get("traits")?,
        backstory: row.try_get("backstory")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CharacterRepositoryPort for SqliteCharacterRepository {
    async fn create(&self, character: &Character) -> Result<()> {
        sqlx::query(
            "INSERT INTO characters (id, story_id, name, traits, backstory, created_at)
            VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(character.id.to_string())
        .bind(character.story_id.to_string())
        .bind(&character.name)
        .bind(&character.traits)
        .bind(&character.backstory)
        .bind(character.created_at)
        .execute(self.connection.pool())
        .await
        .context("Failed to insert character")?;
        Ok(())
    }

    async fn get(&self, id: CharacterId) -> Result<Option<Character>> {
        let row = sqlx::query(
            "SELECT id, story_id, name, traits, backstory, created_at FROM characters WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to fetch character")?;
        row.as_ref().map(row_to_character).transpose()
    }

    async fn list_by_story(&self, story_id: StoryId) -> Result<Vec<Character>> {
        let rows = sqlx::query(
            "SELECT id, story_id, name, traits, backstory, created_at FROM characters
            WHERE story_id = ? ORDER BY created_at",
        )
        .bind(story_id.to_string())
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list characters")?;
        rows.iter().map(row_to_character).collect()
    }

    async fn update(&self, character: &Character) -> Result<()> {
        sqlx::query("UPDATE characters SET name = ?, traits = ?, backstory = ? WHERE id = ?")
            .bind(&character.name)
            .bind(&character.traits)
            .bind(&character.backstory)
            .bind(character.id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to update character")?;
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<()> {
        sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to delete character")?;
        Ok(())
    }

    async fn delete_by_story(&self, story_id: StoryId) -> Result<()> {
        sqlx::query("DELETE FROM characters WHERE story_id = ?")
            .bind(story_id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to delete characters for story")?;
        Ok(())
    }
}
