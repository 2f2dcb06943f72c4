//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Config: Application configuration from the environment
//! - OpenRouter: chat-completion client with retry and backoff
//! - Persistence: in-memory and SQLite document stores
//! - Queues: in-memory and SQLite work queues
//! - HTTP: REST API routes
//! - State: Shared application state

pub mod config;
pub mod http;
pub mod openrouter;
pub mod persistence;
pub mod queues;
pub mod state;
