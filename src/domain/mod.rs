//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Story, Chapter, Scene, Character
//! - Value Objects: typed ids, scene status, character guidance
//! - Domain Services: the TOON codec and scene ordering

pub mod entities;
pub mod services;
pub mod value_objects;
