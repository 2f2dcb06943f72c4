//! OpenRouter LLM integration

mod client;
mod retry;
mod transport;
mod wire;

pub use client::OpenRouterClient;
