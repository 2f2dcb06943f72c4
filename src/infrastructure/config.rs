//! Application configuration

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    /// Document store settings
    pub store: StoreConfig,
    /// Generation queue settings
    pub queue: QueueConfig,
    /// HTTP server port
    pub server_port: u16,
}

/// OpenRouter settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; a missing key is reported when a call is made, not at boot
    pub api_key: Option<String>,
    pub base_url: String,
    /// Model used by both agents and free-form generation
    pub model: String,
    pub referer: String,
    pub title: String,
    /// Attempts per call, including the first
    pub max_retries: u32,
    /// Per-attempt HTTP timeout
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// "memory" or "sqlite"
    pub backend: String,
    pub sqlite_path: String,
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// "memory" or "sqlite"
    pub backend: String,
    pub sqlite_path: String,
    /// Finished jobs older than this are removed by the cleanup task
    pub history_retention_hours: u64,
    /// Maximum concurrent generation runs
    pub generation_concurrency: usize,
}

impl QueueConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.history_retention_hours * 3600)
    }
}

impl LlmConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: env::var("OPENROUTER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            model: env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| "anthropic/claude-3.5-sonnet".to_string()),
            referer: env::var("OPENROUTER_REFERER")
                .unwrap_or_else(|_| "https://narrative-canvas.local".to_string()),
            title: env::var("OPENROUTER_TITLE")
                .unwrap_or_else(|_| "Narrative Canvas Platform".to_string()),
            max_retries: env::var("LLM_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("LLM_MAX_RETRIES must be a non-negative integer")?,
            request_timeout: Duration::from_secs(
                env::var("LLM_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse()
                    .context("LLM_REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            ),
        })
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let sqlite_path =
            env::var("SQLITE_PATH").unwrap_or_else(|_| "./data/narrative_canvas.db".to_string());

        Ok(Self {
            llm: LlmConfig::from_env()?,

            store: StoreConfig {
                backend: env::var("STORE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
                sqlite_path: sqlite_path.clone(),
            },

            queue: QueueConfig {
                backend: env::var("QUEUE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
                sqlite_path,
                history_retention_hours: env::var("QUEUE_RETENTION_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .context("QUEUE_RETENTION_HOURS must be a number of hours")?,
                generation_concurrency: env::var("GENERATION_CONCURRENCY")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .context("GENERATION_CONCURRENCY must be a positive integer")?,
            },

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }
}
