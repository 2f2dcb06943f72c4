//! Generation Queue Service - Concurrency-controlled scene generation
//!
//! Scene generation requests are queued by the scene service and picked up
//! here. Each job runs in its own task; a semaphore bounds how many runs
//! talk to the provider at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::application::dto::GenerationJob;
use crate::application::ports::outbound::{LlmPort, QueueError, QueueItem, QueuePort};
use crate::application::services::generation_service::{GenerationService, JobOutcome};

/// How often finished jobs are swept from the queue
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Service for managing the scene generation queue
pub struct GenerationQueueService<L: LlmPort + 'static> {
    queue: Arc<dyn QueuePort<GenerationJob>>,
    generation: Arc<GenerationService<L>>,
    semaphore: Arc<Semaphore>,
}

impl<L: LlmPort + 'static> GenerationQueueService<L> {
    /// Create a new generation queue service
    ///
    /// # Arguments
    ///
    /// * `queue` - The generation job queue
    /// * `generation` - The orchestrator that runs each job
    /// * `concurrency` - Maximum concurrent generation runs (at least 1)
    pub fn new(
        queue: Arc<dyn QueuePort<GenerationJob>>,
        generation: Arc<GenerationService<L>>,
        concurrency: usize,
    ) -> Self {
        Self {
            queue,
            generation,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Put jobs left in processing by a previous process back in line
    pub async fn recover(&self) -> Result<usize, QueueError> {
        let recovered = self.queue.requeue_processing().await?;
        if recovered > 0 {
            tracing::info!(recovered, "Requeued interrupted generation jobs");
        }
        Ok(recovered)
    }

    /// Background worker that processes generation jobs
    ///
    /// Runs forever. Each job is processed in a spawned task holding a
    /// semaphore permit, so at most `concurrency` runs are in flight.
    pub async fn run_worker(&self) {
        loop {
            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!("Semaphore error: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            let item = match self.queue.dequeue().await {
                Ok(Some(item)) => item,
                Ok(None) => {
                    drop(permit);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
                Err(e) => {
                    tracing::error!("Failed to dequeue generation job: {}", e);
                    drop(permit);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            let generation = self.generation.clone();
            let queue = self.queue.clone();

            tokio::spawn(async move {
                let _permit = permit;
                Self::handle(generation.as_ref(), queue.as_ref(), item).await;
            });
        }
    }

    /// Dequeue and process a single job inline; false when the queue was empty
    #[cfg(test)]
    pub async fn process_next(&self) -> Result<bool, QueueError> {
        match self.queue.dequeue().await? {
            Some(item) => {
                Self::handle(self.generation.as_ref(), self.queue.as_ref(), item).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn handle(
        generation: &GenerationService<L>,
        queue: &dyn QueuePort<GenerationJob>,
        item: QueueItem<GenerationJob>,
    ) {
        let item_id = item.id;
        let result = match generation.process_job(&item.payload).await {
            Ok(JobOutcome::Ran(outcome)) => {
                tracing::info!(
                    item_id = %item_id,
                    scene_id = %item.payload.scene_id,
                    attempts = item.attempts,
                    ?outcome,
                    "Generation job finished"
                );
                queue.complete(item_id).await
            }
            Ok(JobOutcome::Skipped) => queue.complete(item_id).await,
            Err(e) => {
                tracing::error!(
                    item_id = %item_id,
                    scene_id = %item.payload.scene_id,
                    attempts = item.attempts,
                    error = %e,
                    "Generation job failed"
                );
                queue.fail(item_id, &e.to_string()).await
            }
        };

        if let Err(e) = result {
            tracing::error!(item_id = %item_id, "Failed to update generation job status: {}", e);
        }
    }

    /// Periodically remove finished jobs older than `retention`
    pub async fn run_cleanup(&self, retention: Duration) {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match self.queue.cleanup(retention).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Removed finished generation jobs"),
                Err(e) => tracing::error!("Generation queue cleanup failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{QueueItemStatus, SceneRepositoryPort};
    use crate::application::services::testing::ScriptedLlm;
    use crate::domain::entities::Scene;
    use crate::domain::value_objects::{ChapterId, SceneId, SceneStatus, StoryId};
    use crate::infrastructure::persistence::InMemoryStore;
    use crate::infrastructure::queues::InMemoryQueue;

    async fn setup(
        script: Vec<Result<String, String>>,
    ) -> (
        Arc<InMemoryStore>,
        Arc<InMemoryQueue<GenerationJob>>,
        GenerationQueueService<ScriptedLlm>,
    ) {
        let store = Arc::new(InMemoryStore::new());
        let queue = Arc::new(InMemoryQueue::new("generation"));
        let generation = Arc::new(GenerationService::new(
            store.clone(),
            store.clone(),
            Arc::new(ScriptedLlm::new(script)),
            "test-model",
        ));
        let service = GenerationQueueService::new(queue.clone(), generation, 2);
        (store, queue, service)
    }

    async fn requested_scene(store: &InMemoryStore) -> Scene {
        let scene = store
            .create_appended(Scene::new(StoryId::new(), ChapterId::new(), 1, "Outline"))
            .await
            .unwrap();
        store.begin_generation(scene.id, "Outline").await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_successful_job_completes_item() {
        let (store, queue, service) = setup(vec![
            Ok("pov:first-limited".to_string()),
            Ok("Prose.".to_string()),
        ])
        .await;
        let scene = requested_scene(&store).await;
        let id = queue
            .enqueue(GenerationJob::new(scene.id, scene.generation_run))
            .await
            .unwrap();

        assert!(service.process_next().await.unwrap());

        assert_eq!(queue.get(id).await.unwrap().unwrap().status, QueueItemStatus::Completed);
        let stored = SceneRepositoryPort::get(store.as_ref(), scene.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SceneStatus::Complete);
        assert!(!service.process_next().await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_job_fails_item_with_message() {
        let (store, queue, service) = setup(vec![Err("Network error: reset".to_string())]).await;
        let scene = requested_scene(&store).await;
        let id = queue
            .enqueue(GenerationJob::new(scene.id, scene.generation_run))
            .await
            .unwrap();

        service.process_next().await.unwrap();

        let item = queue.get(id).await.unwrap().unwrap();
        assert_eq!(item.status, QueueItemStatus::Failed);
        assert_eq!(item.error.as_deref(), Some("Network error: reset"));
    }

    #[tokio::test]
    async fn test_missing_scene_fails_item() {
        let (_store, queue, service) = setup(vec![]).await;
        let id = queue.enqueue(GenerationJob::new(SceneId::new(), 1)).await.unwrap();

        service.process_next().await.unwrap();

        let item = queue.get(id).await.unwrap().unwrap();
        assert_eq!(item.status, QueueItemStatus::Failed);
        assert!(item.error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_recover_requeues_interrupted_jobs() {
        let (_store, queue, service) = setup(vec![]).await;
        queue.enqueue(GenerationJob::new(SceneId::new(), 1)).await.unwrap();
        queue.dequeue().await.unwrap();

        assert_eq!(service.recover().await.unwrap(), 1);
        assert_eq!(queue.depth().await.unwrap(), 1);
    }
}
