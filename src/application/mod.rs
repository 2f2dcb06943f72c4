//! Application layer - Use cases, generation agents and the ports they need
//!
//! This layer contains:
//! - Ports: traits for the LLM provider, repositories and work queues
//! - Services: story/chapter/scene/character use cases, the Character Agent,
//!   the Scene Writer Agent and the generation orchestrator
//! - DTOs: serializable shapes for the REST API and queue payloads

pub mod dto;
pub mod ports;
pub mod services;
