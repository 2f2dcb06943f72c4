//! Health check and queue status routes

use axum::{extract::State, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub async fn health() -> &'static str {
    "OK"
}

/// Pending and processing counts of the generation queue
pub async fn queue_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let pending = match state.generation_queue.depth().await {
        Ok(depth) => depth,
        Err(e) => {
            tracing::warn!("Failed to read generation queue depth: {}", e);
            0
        }
    };

    let processing = match state.generation_queue.processing_count().await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Failed to read generation queue processing count: {}", e);
            0
        }
    };

    Json(json!({
        "status": "healthy",
        "queues": {
            "generation": {
                "pending": pending,
                "processing": processing,
            },
        },
    }))
}
