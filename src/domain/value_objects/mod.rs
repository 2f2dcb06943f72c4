//! Value objects - Immutable objects defined by their attributes

mod guidance;
mod ids;
mod scene_status;

pub use guidance::{Guidance, GuidanceField};
pub use ids::*;
pub use scene_status::SceneStatus;
