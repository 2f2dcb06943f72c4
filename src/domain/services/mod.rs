//! Domain services - Pure operations over domain entities

pub mod scene_ordering;
pub mod toon;
