//! Scene ordering within a chapter
//!
//! Positions are 1-based and dense: a chapter with N scenes always holds
//! positions 1..=N exactly once.

use crate::domain::entities::Scene;
use crate::domain::value_objects::SceneId;

/// A scene whose stored position has to change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionChange {
    pub scene_id: SceneId,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
    #[error("Scene {0} is not in this chapter")]
    UnknownScene(SceneId),
    #[error("Position {position} is out of range 1..={count}")]
    OutOfRange { position: u32, count: usize },
}

/// Position assigned to a newly created scene
pub fn next_position(existing: usize) -> u32 {
    existing as u32 + 1
}

/// Move `scene_id` to `position`, returning the renumbering to apply
pub fn move_scene(
    scenes: &[Scene],
    scene_id: SceneId,
    position: u32,
) -> Result<Vec<PositionChange>, OrderingError> {
    let mut ordered = sorted(scenes);

    let count = ordered.len();
    if position < 1 || position as usize > count {
        return Err(OrderingError::OutOfRange { position, count });
    }

    let from = ordered
        .iter()
        .position(|s| s.id == scene_id)
        .ok_or(OrderingError::UnknownScene(scene_id))?;

    let moving = ordered.remove(from);
    ordered.insert(position as usize - 1, moving);

    Ok(changes(&ordered))
}

/// Close gaps left by a deletion
pub fn compact(scenes: &[Scene]) -> Vec<PositionChange> {
    changes(&sorted(scenes))
}

fn sorted(scenes: &[Scene]) -> Vec<&Scene> {
    let mut ordered: Vec<&Scene> = scenes.iter().collect();
    ordered.sort_by_key(|s| s.position);
    ordered
}

fn changes(ordered: &[&Scene]) -> Vec<PositionChange> {
    ordered
        .iter()
        .enumerate()
        .filter_map(|(idx, scene)| {
            let position = idx as u32 + 1;
            (scene.position != position).then_some(PositionChange {
                scene_id: scene.id,
                position,
            })
        })
        .collect()
}
