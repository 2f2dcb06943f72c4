//! Narrative Canvas - Backend API for outlining stories and generating scene prose
//!
//! The service:
//! - Stores stories, chapters, scenes and characters (in memory or SQLite)
//! - Queues scene generation requests and runs them in background workers
//! - Talks to OpenRouter for the Character Agent and Scene Writer Agent

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::{GenerationQueueService, GenerationService};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::openrouter::OpenRouterClient;
use crate::infrastructure::persistence::Repositories;
use crate::infrastructure::queues::QueueFactory;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "narrative_canvas=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Narrative Canvas");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  OpenRouter: {} ({})", config.llm.base_url, config.llm.model);
    tracing::info!("  Store: {}", config.store.backend);
    tracing::info!("  Queue: {}", config.queue.backend);
    if config.llm.api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; generation requests will fail");
    }

    let repositories = Repositories::from_config(&config.store).await?;

    let queue_factory = QueueFactory::new(config.queue.clone()).await?;
    let generation_queue = queue_factory.create_generation_queue().await?;

    let llm = Arc::new(
        OpenRouterClient::from_config(&config.llm).context("Failed to build OpenRouter client")?,
    );

    let generation_service = Arc::new(GenerationService::new(
        repositories.scenes.clone(),
        repositories.characters.clone(),
        llm.clone(),
        config.llm.model.clone(),
    ));
    let generation_queue_service = Arc::new(GenerationQueueService::new(
        generation_queue.clone(),
        generation_service,
        config.queue.generation_concurrency,
    ));

    // Jobs left in processing by a previous run go back in line
    generation_queue_service
        .recover()
        .await
        .context("Failed to recover interrupted generation jobs")?;

    let state = Arc::new(AppState::new(&repositories, generation_queue, llm));
    tracing::info!("Application state initialized");

    // Start background queue workers
    let generation_worker = {
        let service = generation_queue_service.clone();
        tokio::spawn(async move {
            tracing::info!("Starting scene generation worker");
            service.run_worker().await;
        })
    };

    // Cleanup worker (removes old completed/failed queue items)
    let cleanup_worker = {
        let service = generation_queue_service.clone();
        let retention = config.queue.retention();
        tokio::spawn(async move {
            tracing::info!("Starting queue cleanup worker");
            service.run_cleanup(retention).await;
        })
    };

    tracing::info!("Background queue workers started");

    // Build the router
    let app = http::create_routes()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    let server = axum::serve(listener, app);

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping workers...");
            generation_worker.abort();
            cleanup_worker.abort();
            tracing::info!("Workers stopped");
        }
    }

    Ok(())
}
