//! In-memory queue backend
//!
//! Items live only as long as the process; `requeue_processing` is still
//! honoured so the worker's recovery path behaves the same on both backends.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::application::ports::outbound::{QueueError, QueueItem, QueueItemStatus, QueuePort};
use crate::domain::value_objects::QueueItemId;

struct QueueState<T> {
    items: HashMap<QueueItemId, QueueItem<T>>,
    pending: VecDeque<QueueItemId>,
}

#[derive(Clone)]
pub struct InMemoryQueue<T> {
    name: String,
    state: Arc<Mutex<QueueState<T>>>,
}

impl<T> InMemoryQueue<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(QueueState {
                items: HashMap::new(),
                pending: VecDeque::new(),
            })),
        }
    }


    async fn finish(
        &self,
        id: QueueItemId,
        status: QueueItemStatus,
        error: Option<&str>,
    ) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        let item = state.items.get_mut(&id).ok_or(QueueError::NotFound(id))?;
        item.status = status;
        item.error = error.map(str::to_string);
        item.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl<T> QueuePort<T> for InMemoryQueue<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn enqueue(&self, payload: T) -> Result<QueueItemId, QueueError> {
        let item = QueueItem::new(payload);
        let id = item.id;
        let mut state = self.state.lock().await;
        state.items.insert(id, item);
        state.pending.push_back(id);
        tracing::debug!(queue = %self.name, item_id = %id, "Enqueued item");
        Ok(id)
    }

    async fn dequeue(&self) -> Result<Option<QueueItem<T>>, QueueError> {
        let mut state = self.state.lock().await;
        while let Some(id) = state.pending.pop_front() {
            if let Some(item) = state.items.get_mut(&id) {
                if item.status != QueueItemStatus::Pending {
                    continue;
                }
                item.status = QueueItemStatus::Processing;
                item.attempts += 1;
                item.updated_at = Utc::now();
                return Ok(Some(item.clone()));
            }
        }
        Ok(None)
    }

    async fn complete(&self, id: QueueItemId) -> Result<(), QueueError> {
        self.finish(id, QueueItemStatus::Completed, None).await
    }

    async fn fail(&self, id: QueueItemId, error: &str) -> Result<(), QueueError> {
        self.finish(id, QueueItemStatus::Failed, Some(error)).await
    }

    #[cfg(test)]
    async fn get(&self, id: QueueItemId) -> Result<Option<QueueItem<T>>, QueueError> {
        Ok(self.state.lock().await.items.get(&id).cloned())
    }

    async fn depth(&self) -> Result<usize, QueueError> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .values()
            .filter(|i| i.status == QueueItemStatus::Pending)
            .count())
    }

    async fn processing_count(&self) -> Result<usize, QueueError> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .values()
            .filter(|i| i.status == QueueItemStatus::Processing)
            .count())
    }

    async fn requeue_processing(&self) -> Result<usize, QueueError> {
        let mut state = self.state.lock().await;
        let mut stuck: Vec<(chrono::DateTime<Utc>, QueueItemId)> = state
            .items
            .values()
            .filter(|i| i.status == QueueItemStatus::Processing)
            .map(|i| (i.created_at, i.id))
            .collect();
        stuck.sort_by_key(|(created_at, _)| *created_at);

        let now = Utc::now();
        for (_, id) in &stuck {
            if let Some(item) = state.items.get_mut(id) {
                item.status = QueueItemStatus::Pending;
                item.updated_at = now;
            }
        }
        for (_, id) in stuck.iter().rev() {
            state.pending.push_front(*id);
        }
        Ok(stuck.len())
    }

    async fn cleanup(&self, older_than: Duration) -> Result<usize, QueueError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(older_than)
                .map_err(|e| QueueError::Backend(e.to_string()))?;
        let mut state = self.state.lock().await;
        let before = state.items.len();
        state
            .items
            .retain(|_, item| !(item.status.is_finished() && item.updated_at <= cutoff));
        Ok(before - state.items.len())
    }
}
