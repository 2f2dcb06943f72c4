//! Domain entities - Core business objects with identity

mod chapter;
mod character;
mod scene;
mod story;

pub use chapter::Chapter;
pub use character::Character;
pub use scene::Scene;
pub use story::{Story, DEFAULT_CHAPTER_COUNT};
