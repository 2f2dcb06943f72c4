//! Queue item types - Payloads that flow through the work queues

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SceneId;

/// A requested generation run for one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub scene_id: SceneId,
    /// Run token assigned when the request was accepted
    pub run: u64,
    pub requested_at: DateTime<Utc>,
}

impl GenerationJob {
    pub fn new(scene_id: SceneId, run: u64) -> Self {
        Self {
            scene_id,
            run,
            requested_at: Utc::now(),
        }
    }
}
