//! Queue port - Durable hand-off of units of work to background workers
//!
//! Delivery is at-least-once: an item that was dequeued but never completed
//! or failed (for example because the process died) goes back to pending
//! through `requeue_processing`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::QueueItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueItemStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl QueueItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// An item held by a queue
#[derive(Debug, Clone, Serialize)]
pub struct QueueItem<T> {
    pub id: QueueItemId,
    pub payload: T,
    pub status: QueueItemStatus,
    /// Number of times the item has been dequeued
    pub attempts: u32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T> QueueItem<T> {
    pub fn new(payload: T) -> Self {
        let now = Utc::now();
        Self {
            id: QueueItemId::new(),
            payload,
            status: QueueItemStatus::Pending,
            attempts: 0,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue backend error: {0}")]
    Backend(String),
    #[error("Queue item not found: {0}")]
    NotFound(QueueItemId),
    #[error("Queue payload serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait QueuePort<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Add an item and return immediately
    async fn enqueue(&self, payload: T) -> Result<QueueItemId, QueueError>;

    /// Take the oldest pending item and mark it processing
    async fn dequeue(&self) -> Result<Option<QueueItem<T>>, QueueError>;

    async fn complete(&self, id: QueueItemId) -> Result<(), QueueError>;

    async fn fail(&self, id: QueueItemId, error: &str) -> Result<(), QueueError>;

    #[cfg(test)]
    async fn get(&self, id: QueueItemId) -> Result<Option<QueueItem<T>>, QueueError>;

    /// Number of pending items
    async fn depth(&self) -> Result<usize, QueueError>;

    async fn processing_count(&self) -> Result<usize, QueueError>;

    /// Return items stuck in processing to pending
    async fn requeue_processing(&self) -> Result<usize, QueueError>;

    /// Remove finished items last updated before `older_than` ago
    async fn cleanup(&self, older_than: Duration) -> Result<usize, QueueError>;
}
