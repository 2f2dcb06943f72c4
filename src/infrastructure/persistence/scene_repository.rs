//! Scene repository implementation for SQLite

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::connection::{parse_id, SqliteConnection};
use crate::application::ports::outbound::{
    GenerationOutcome, SceneMove, SceneRepositoryPort, ScenePatch,
};
use crate::domain::entities::Scene;
use crate::domain::services::scene_ordering::{compact, move_scene, PositionChange};
use crate::domain::value_objects::{ChapterId, SceneId, SceneStatus, StoryId};

const SCENE_COLUMNS: &str = "id, story_id, chapter_id, position, outline, prose, status, \
     error_message, regeneration_count, generation_run, created_at, updated_at";

/// Repository for Scene operations
pub struct SqliteSceneRepository {
    connection: SqliteConnection,
}

impl SqliteSceneRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

fn row_to_scene(row: &SqliteRow) -> Result<Scene> {
    let id: String = row.try_get("id")?;
    let story_id: String = row.try_get("story_id")?;
    let chapter_id: String = row.try_get("chapter_id")?;
    let position: i64 = row.try_get("position")?;
    let status: String = row.try_get("status")?;
    let regeneration_count: i64 = row.try_get("regeneration_count")?;
    let generation_run: i64 = row.try_get("generation_run")?;

    Ok(Scene {
        id: parse_id(&id)?,
        story_id: parse_id(&story_id)?,
        chapter_id: parse_id(&chapter_id)?,
        position: u32::try_from(position).context("Scene position out of range")?,
        outline: row.try_get("outline")?,
        prose: row.try_get("prose")?,
        status: status
            .parse::<SceneStatus>()
            .map_err(anyhow::Error::msg)?,
        error_message: row.try_get("error_message")?,
        regeneration_count: u32::try_from(regeneration_count)
            .context("Regeneration count out of range")?,
        generation_run: u64::try_from(generation_run).context("Generation run out of range")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

async fn list_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    chapter_id: &str,
) -> Result<Vec<Scene>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM scenes WHERE chapter_id = ? ORDER BY position",
        SCENE_COLUMNS
    ))
    .bind(chapter_id)
    .fetch_all(&mut **tx)
    .await
    .context("Failed to list scenes for chapter")?;
    rows.iter().map(row_to_scene).collect()
}

/// Write new positions in two passes so `UNIQUE(chapter_id, position)`
/// holds after every statement
async fn apply_positions(
    tx: &mut Transaction<'_, Sqlite>,
    chapter_id: &str,
    changes: &[PositionChange],
) -> Result<()> {
    if changes.is_empty() {
        return Ok(());
    }

    let now = Utc::now();
    for change in changes {
        sqlx::query("UPDATE scenes SET position = ?, updated_at = ? WHERE id = ?")
            .bind(-i64::from(change.position))
            .bind(now)
            .bind(change.scene_id.to_string())
            .execute(&mut **tx)
            .await
            .context("Failed to update scene position")?;
    }
    sqlx::query("UPDATE scenes SET position = -position WHERE chapter_id = ? AND position < 0")
        .bind(chapter_id)
        .execute(&mut **tx)
        .await
        .context("Failed to settle scene positions")?;
    Ok(())
}

#[async_trait]
impl SceneRepositoryPort for SqliteSceneRepository {
    async fn create_appended(&self, scene: Scene) -> Result<Scene> {
        let row = sqlx::query(&format!(
            "INSERT INTO scenes ({cols})
             SELECT ?, ?, ?, COALESCE(MAX(position), 0) + 1, ?, ?, ?, ?, ?, ?, ?, ?
             FROM scenes WHERE chapter_id = ?
             RETURNING {cols}",
            cols = SCENE_COLUMNS
        ))
        .bind(scene.id.to_string())
        .bind(scene.story_id.to_string())
        .bind(scene.chapter_id.to_string())
        .bind(&scene.outline)
        .bind(&scene.prose)
        .bind(scene.status.as_str())
        .bind(&scene.error_message)
        .bind(i64::from(scene.regeneration_count))
        .bind(scene.generation_run as i64)
        .bind(scene.created_at)
        .bind(scene.updated_at)
        .bind(scene.chapter_id.to_string())
        .fetch_one(self.connection.pool())
        .await
        .context("Failed to insert scene")?;
        row_to_scene(&row)
    }

    async fn get(&self, id: SceneId) -> Result<Option<Scene>> {
        let row = sqlx::query(&format!("SELECT {} FROM scenes WHERE id = ?", SCENE_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(self.connection.pool())
            .await
            .context("Failed to fetch scene")?;
        row.as_ref().map(row_to_scene).transpose()
    }

    async fn list_by_chapter(&self, chapter_id: ChapterId) -> Result<Vec<Scene>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM scenes WHERE chapter_id = ? ORDER BY position",
            SCENE_COLUMNS
        ))
        .bind(chapter_id.to_string())
        .fetch_all(self.connection.pool())
        .await
        .context("Failed to list scenes for chapter")?;
        rows.iter().map(row_to_scene).collect()
    }

    async fn patch(&self, id: SceneId, patch: ScenePatch) -> Result<Option<Scene>> {
        let row = sqlx::query(&format!(
            "UPDATE scenes SET
                outline = COALESCE(?, outline),
                prose = COALESCE(?, prose),
                status = COALESCE(?, status),
                error_message = COALESCE(?, error_message),
                updated_at = ?
            WHERE id = ?
            RETURNING {}",
            SCENE_COLUMNS
        ))
        .bind(patch.outline)
        .bind(patch.prose)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.error_message)
        .bind(Utc::now())
        .bind(id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to patch scene")?;
        row.as_ref().map(row_to_scene).transpose()
    }

    async fn move_to(&self, id: SceneId, position: u32) -> Result<SceneMove> {
        let mut tx = self
            .connection
            .pool()
            .begin()
            .await
            .context("Failed to start transaction")?;

        // Writing first takes the database write lock before the siblings are read
        let chapter_id: Option<String> = sqlx::query_scalar(
            "UPDATE scenes SET updated_at = ? WHERE id = ? RETURNING chapter_id",
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to lock scene for move")?;
        let Some(chapter_id) = chapter_id else {
            return Ok(SceneMove::NotFound);
        };

        let siblings = list_in_tx(&mut tx, &chapter_id).await?;
        let changes = match move_scene(&siblings, id, position) {
            Ok(changes) => changes,
            Err(e) => return Ok(SceneMove::Rejected(e)),
        };
        apply_positions(&mut tx, &chapter_id, &changes).await?;

        let row = sqlx::query(&format!("SELECT {} FROM scenes WHERE id = ?", SCENE_COLUMNS))
            .bind(id.to_string())
            .fetch_one(&mut *tx)
            .await
            .context("Failed to fetch moved scene")?;
        let moved = row_to_scene(&row)?;

        tx.commit().await.context("Failed to commit scene move")?;
        Ok(SceneMove::Moved(moved))
    }

    async fn delete(&self, id: SceneId) -> Result<bool> {
        let mut tx = self
            .connection
            .pool()
            .begin()
            .await
            .context("Failed to start transaction")?;

        let chapter_id: Option<String> =
            sqlx::query_scalar("DELETE FROM scenes WHERE id = ? RETURNING chapter_id")
                .bind(id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to delete scene")?;
        let Some(chapter_id) = chapter_id else {
            return Ok(false);
        };

        let remaining = list_in_tx(&mut tx, &chapter_id).await?;
        apply_positions(&mut tx, &chapter_id, &compact(&remaining)).await?;

        tx.commit().await.context("Failed to commit scene deletion")?;
        Ok(true)
    }

    async fn delete_by_story(&self, story_id: StoryId) -> Result<()> {
        sqlx::query("DELETE FROM scenes WHERE story_id = ?")
            .bind(story_id.to_string())
            .execute(self.connection.pool())
            .await
            .context("Failed to delete scenes for story")?;
        Ok(())
    }

    async fn begin_generation(&self, id: SceneId, outline: &str) -> Result<Option<Scene>> {
        let row = sqlx::query(&format!(
            "UPDATE scenes SET
                outline = ?,
                status = ?,
                regeneration_count = regeneration_count
                    + CASE WHEN prose IS NOT NULL AND prose <> '' THEN 1 ELSE 0 END,
                generation_run = generation_run + 1,
                updated_at = ?
            WHERE id = ?
            RETURNING {}",
            SCENE_COLUMNS
        ))
        .bind(outline)
        .bind(SceneStatus::Generating.as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .fetch_optional(self.connection.pool())
        .await
        .context("Failed to begin scene generation")?;
        row.as_ref().map(row_to_scene).transpose()
    }

    async fn finish_generation(
        &self,
        id: SceneId,
        run: u64,
        outcome: GenerationOutcome,
    ) -> Result<bool> {
        let (status, prose, error_message) = match outcome {
            GenerationOutcome::Completed { prose } => (SceneStatus::Complete, Some(prose), None),
            GenerationOutcome::Failed { message } => (SceneStatus::Error, None, Some(message)),
        };

        let result = sqlx::query(
            "UPDATE scenes SET
                status = ?,
                prose = COALESCE(?, prose),
                error_message = ?,
                updated_at = ?
            WHERE id = ? AND generation_run = ?",
        )
        .bind(status.as_str())
        .bind(prose)
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(run as i64)
        .execute(self.connection.pool())
        .await
        .context("Failed to finish scene generation")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteSceneRepository {
        let connection = SqliteConnection::in_memory().await.unwrap();
        connection.initialize_schema().await.unwrap();
        SqliteSceneRepository::new(connection)
    }

    fn scene(chapter_id: ChapterId, position: u32) -> Scene {
        Scene::new(StoryId::new(), chapter_id, position, format!("Scene {}", position))
    }

    async fn stored(repo: &SqliteSceneRepository, scene: Scene) -> Scene {
        repo.create_appended(scene).await.unwrap()
    }

    async fn chapter_order(repo: &SqliteSceneRepository, chapter_id: ChapterId) -> Vec<(String, u32)> {
        repo.list_by_chapter(chapter_id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.outline, s.position))
            .collect()
    }

    #[tokio::test]
    async fn test_create_appends_per_chapter() {
        let repo = repo().await;
        let chapter_id = ChapterId::new();
        for position in [9, 9, 9] {
            stored(&repo, scene(chapter_id, position)).await;
        }
        let other = stored(&repo, scene(ChapterId::new(), 9)).await;

        let listed = repo.list_by_chapter(chapter_id).await.unwrap();
        let positions: Vec<u32> = listed.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(listed[0].status, SceneStatus::Draft);
        assert_eq!(other.position, 1);
    }

    #[tokio::test]
    async fn test_duplicate_position_is_rejected_by_schema() {
        let repo = repo().await;
        let existing = stored(&repo, scene(ChapterId::new(), 1)).await;

        let duplicate = sqlx::query(
            "INSERT INTO scenes (id, story_id, chapter_id, position, outline, status, created_at, updated_at)
             VALUES (?, ?, ?, 1, 'Dup', 'draft', ?, ?)",
        )
        .bind(SceneId::new().to_string())
        .bind(existing.story_id.to_string())
        .bind(existing.chapter_id.to_string())
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(repo.connection.pool())
        .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_regeneration_counter_only_counts_existing_prose() {
        let repo = repo().await;
        let scene = stored(&repo, scene(ChapterId::new(), 1)).await;

        let first = repo.begin_generation(scene.id, "v1").await.unwrap().unwrap();
        assert_eq!(first.status, SceneStatus::Generating);
        assert_eq!(first.regeneration_count, 0);
        assert_eq!(first.generation_run, 1);
        assert_eq!(first.outline, "v1");

        assert!(repo
            .finish_generation(
                scene.id,
                first.generation_run,
                GenerationOutcome::Completed { prose: "Prose.".to_string() },
            )
            .await
            .unwrap());

        let second = repo.begin_generation(scene.id, "v2").await.unwrap().unwrap();
        assert_eq!(second.regeneration_count, 1);
        let third = repo.begin_generation(scene.id, "v3").await.unwrap().unwrap();
        assert_eq!(third.regeneration_count, 2);
        assert_eq!(third.generation_run, 3);
    }

    #[tokio::test]
    async fn test_finish_generation_respects_run_token() {
        let repo = repo().await;
        let scene = stored(&repo, scene(ChapterId::new(), 1)).await;

        let stale = repo.begin_generation(scene.id, "v1").await.unwrap().unwrap();
        let current = repo.begin_generation(scene.id, "v2").await.unwrap().unwrap();

        assert!(!repo
            .finish_generation(
                scene.id,
                stale.generation_run,
                GenerationOutcome::Completed { prose: "stale".to_string() },
            )
            .await
            .unwrap());
        assert!(repo
            .finish_generation(
                scene.id,
                current.generation_run,
                GenerationOutcome::Failed { message: "LLM error: boom".to_string() },
            )
            .await
            .unwrap());

        let stored = repo.get(scene.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SceneStatus::Error);
        assert_eq!(stored.error_message.as_deref(), Some("LLM error: boom"));
        assert!(stored.prose.is_none());
    }

    #[tokio::test]
    async fn test_completion_clears_error_and_failure_keeps_prose() {
        let repo = repo().await;
        let scene = stored(&repo, scene(ChapterId::new(), 1)).await;

        let run = repo.begin_generation(scene.id, "v1").await.unwrap().unwrap().generation_run;
        repo.finish_generation(scene.id, run, GenerationOutcome::Failed { message: "boom".to_string() })
            .await
            .unwrap();
        let run = repo.begin_generation(scene.id, "v2").await.unwrap().unwrap().generation_run;
        repo.finish_generation(scene.id, run, GenerationOutcome::Completed { prose: "Prose.".to_string() })
            .await
            .unwrap();

        let stored = repo.get(scene.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SceneStatus::Complete);
        assert!(stored.error_message.is_none());

        let run = repo.begin_generation(scene.id, "v3").await.unwrap().unwrap().generation_run;
        repo.finish_generation(scene.id, run, GenerationOutcome::Failed { message: "again".to_string() })
            .await
            .unwrap();
        let stored = repo.get(scene.id).await.unwrap().unwrap();
        assert_eq!(stored.prose.as_deref(), Some("Prose."));
    }

    #[tokio::test]
    async fn test_patch() {
        let repo = repo().await;
        let a = stored(&repo, scene(ChapterId::new(), 1)).await;

        let patched = repo
            .patch(
                a.id,
                ScenePatch {
                    outline: Some("Rewritten".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.outline, "Rewritten");
        assert!(repo.patch(SceneId::new(), ScenePatch::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_move_and_delete_renumber_chapter() {
        let repo = repo().await;
        let chapter_id = ChapterId::new();
        let story_id = StoryId::new();
        let mut ids = Vec::new();
        for outline in ["A", "B", "C", "D"] {
            ids.push(stored(&repo, Scene::new(story_id, chapter_id, 0, outline)).await.id);
        }

        match repo.move_to(ids[3], 1).await.unwrap() {
            SceneMove::Moved(scene) => assert_eq!(scene.position, 1),
            other => panic!("unexpected move result: {:?}", other),
        }
        assert_eq!(
            chapter_order(&repo, chapter_id).await,
            vec![
                ("D".to_string(), 1),
                ("A".to_string(), 2),
                ("B".to_string(), 3),
                ("C".to_string(), 4),
            ]
        );

        assert!(matches!(repo.move_to(ids[0], 5).await.unwrap(), SceneMove::Rejected(_)));
        assert!(matches!(repo.move_to(SceneId::new(), 1).await.unwrap(), SceneMove::NotFound));

        assert!(repo.delete(ids[0]).await.unwrap());
        assert!(!repo.delete(ids[0]).await.unwrap());
        assert_eq!(
            chapter_order(&repo, chapter_id).await,
            vec![
                ("D".to_string(), 1),
                ("B".to_string(), 2),
                ("C".to_string(), 3),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_get_distinct_positions() {
        let repo = std::sync::Arc::new(repo().await);
        let chapter_id = ChapterId::new();

        let handles: Vec<_> = (0..40)
            .map(|n| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create_appended(scene(chapter_id, n)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let positions: Vec<u32> = repo
            .list_by_chapter(chapter_id)
            .await
            .unwrap()
            .iter()
            .map(|s| s.position)
            .collect();
        assert_eq!(positions, (1..=40).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_whitespace_prose_counts_for_regeneration() {
        let repo = repo().await;
        let scene = stored(&repo, scene(ChapterId::new(), 1)).await;
        repo.patch(
            scene.id,
            ScenePatch {
                prose: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let started = repo.begin_generation(scene.id, "v1").await.unwrap().unwrap();
        assert_eq!(started.regeneration_count, 1);
    }
}
