//! SQLite queue backend
//!
//! All queues share one `queue_items` table partitioned by queue name.
//! Payloads are stored as JSON.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::application::ports::outbound::{QueueError, QueueItem, QueueItemStatus, QueuePort};
use crate::domain::value_objects::QueueItemId;

fn backend(error: sqlx::Error) -> QueueError {
    QueueError::Backend(error.to_string())
}

pub struct SqliteQueue<T> {
    pool: SqlitePool,
    name: String,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Clone for SqliteQueue<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            name: self.name.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> SqliteQueue<T>
where
    T: Serialize + DeserializeOwned,
{
    pub async fn new(pool: SqlitePool, name: impl Into<String>) -> Result<Self, QueueError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS queue_items (
                id TEXT PRIMARY KEY,
                queue_name TEXT NOT NULL,
                payload TEXT NOT NULL,
                status TEXT NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0,
                error TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#,
        )
        .execute(&pool)
        .await
        .map_err(backend)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_queue_items_status
            ON queue_items(queue_name, status, created_at)",
        )
        .execute(&pool)
        .await
        .map_err(backend)?;

        Ok(Self {
            pool,
            name: name.into(),
            _payload: PhantomData,
        })
    }


    fn row_to_item(row: &SqliteRow) -> Result<QueueItem<T>, QueueError> {
        let id: String = row.try_get("id").map_err(backend)?;
        let payload: String = row.try_get("payload").map_err(backend)?;
        let status: String = row.try_get("status").map_err(backend)?;
        let attempts: i64 = row.try_get("attempts").map_err(backend)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(backend)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(backend)?;

        Ok(QueueItem {
            id: Uuid::parse_str(&id)
                .map(QueueItemId::from)
                .map_err(|e| QueueError::Backend(e.to_string()))?,
            payload: serde_json::from_str(&payload)
                .map_err(|e| QueueError::Serialization(e.to_string()))?,
            status: QueueItemStatus::parse(&status)
                .ok_or_else(|| QueueError::Backend(format!("Unknown queue status: {}", status)))?,
            attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
            error: row.try_get("error").map_err(backend)?,
            created_at,
            updated_at,
        })
    }

    async fn finish(
        &self,
        id: QueueItemId,
        status: QueueItemStatus,
        error: Option<&str>,
    ) -> Result<(), QueueError> {
        let result = sqlx::query(
            "UPDATE queue_items SET status = ?, error = ?, updated_at = ?
            WHERE id = ? AND queue_name = ?",
        )
        .bind(status.as_str())
        .bind(error)
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(&self.name)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(QueueError::NotFound(id));
        }
        Ok(())
    }

    async fn count_status(&self, status: QueueItemStatus) -> Result<usize, QueueError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM queue_items WHERE queue_name = ? AND status = ?")
                .bind(&self.name)
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;
        Ok(count as usize)
    }
}

#[async_trait]
impl<T> QueuePort<T> for SqliteQueue<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn enqueue(&self, payload: T) -> Result<QueueItemId, QueueError> {
        let item = QueueItem::new(payload);
        let json = serde_json::to_string(&item.payload)
            .map_err(|e| QueueError::Serialization(e.to_string()))?;

        sqlx::query(
            "INSERT INTO queue_items (id, queue_name, payload, status, attempts, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(item.id.to_string())
        .bind(&self.name)
        .bind(json)
        .bind(QueueItemStatus::Pending.as_str())
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        tracing::debug!(queue = %self.name, item_id = %item.id, "Enqueued item");
        Ok(item.id)
    }

    async fn dequeue(&self) -> Result<Option<QueueItem<T>>, QueueError> {
        // Single statement so two workers never claim the same item
        let row = sqlx::query(
            "UPDATE queue_items
            SET status = ?, attempts = attempts + 1, updated_at = ?
            WHERE id = (
                SELECT id FROM queue_items
                WHERE queue_name = ? AND status = ?
                ORDER BY created_at
                LIMIT 1
            )
            RETURNING id, payload, status, attempts, error, created_at, updated_at",
        )
        .bind(QueueItemStatus::Processing.as_str())
        .bind(Utc::now())
        .bind(&self.name)
        .bind(QueueItemStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn complete(&self, id: QueueItemId) -> Result<(), QueueError> {
        self.finish(id, QueueItemStatus::Completed, None).await
    }

    async fn fail(&self, id: QueueItemId, error: &str) -> Result<(), QueueError> {
        self.finish(id, QueueItemStatus::Failed, Some(error)).await
    }

    #[cfg(test)]
    async fn get(&self, id: QueueItemId) -> Result<Option<QueueItem<T>>, QueueError> {
        let row = sqlx::query(
            "SELECT id, payload, status, attempts, error, created_at, updated_at
            FROM queue_items WHERE id = ? AND queue_name = ?",
        )
        .bind(id.to_string())
        .bind(&self.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn depth(&self) -> Result<usize, QueueError> {
        self.count_status(QueueItemStatus::Pending).await
    }

    async fn processing_count(&self) -> Result<usize, QueueError> {
        self.count_status(QueueItemStatus::Processing).await
    }

    async fn requeue_processing(&self) -> Result<usize, QueueError> {
        let result = sqlx::query(
            "UPDATE queue_items SET status = ?, updated_at = ?
            WHERE queue_name = ? AND status = ?",
        )
        .bind(QueueItemStatus::Pending.as_str())
        .bind(Utc::now())
        .bind(&self.name)
        .bind(QueueItemStatus::Processing.as_str())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(result.rows_affected() as usize)
    }

    async fn cleanup(&self, older_than: Duration) -> Result<usize, QueueError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(older_than)
                .map_err(|e| QueueError::Backend(e.to_string()))?;

        let result = sqlx::query(
            "DELETE FROM queue_items
            WHERE queue_name = ? AND status IN (?, ?) AND julianday(updated_at) <= julianday(?)",
        )
        .bind(&self.name)
        .bind(QueueItemStatus::Completed.as_str())
        .bind(QueueItemStatus::Failed.as_str())
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(result.rows_affected() as usize)
    }
}
