use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Scene;
use crate::domain::value_objects::SceneStatus;

#[derive(Debug, Deserialize)]
pub struct CreateSceneRequestDto {
    pub outline: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSceneRequestDto {
    #[serde(default)]
    pub outline: Option<String>,
    #[serde(default)]
    pub prose: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveSceneRequestDto {
    pub position: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSceneStatusRequestDto {
    pub status: SceneStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Body of a (re)generation request; the outline is saved with the request
#[derive(Debug, Deserialize)]
pub struct GenerateSceneRequestDto {
    pub outline: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateSceneResponseDto {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct SceneResponseDto {
    pub id: String,
    pub story_id: String,
    pub chapter_id: String,
    pub position: u32,
    pub outline: String,
    pub prose: Option<String>,
    pub status: SceneStatus,
    pub error_message: Option<String>,
    pub regeneration_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Scene> for SceneResponseDto {
    fn from(s: Scene) -> Self {
        Self {
            id: s.id.to_string(),
            story_id: s.story_id.to_string(),
            chapter_id: s.chapter_id.to_string(),
            position: s.position,
            outline: s.outline,
            prose: s.prose,
            status: s.status,
            error_message: s.error_message,
            regeneration_count: s.regeneration_count,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}
