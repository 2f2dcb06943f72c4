//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so the HTTP adapter can
//! serialize/deserialize without pulling serde into the domain model.

mod character;
mod llm;
mod queue_items;
mod scene;
mod story;

pub use character::*;
pub use llm::*;
pub use queue_items::*;
pub use scene::*;
pub use story::*;
