use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Character;

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequestDto {
    pub name: String,
    pub traits: String,
    #[serde(default)]
    pub backstory: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCharacterRequestDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub traits: Option<String>,
    #[serde(default)]
    pub backstory: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CharacterResponseDto {
    pub id: String,
    pub story_id: String,
    pub name: String,
    pub traits: String,
    pub backstory: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Character> for CharacterResponseDto {
    fn from(c: Character) -> Self {
        Self {
            id: c.id.to_string(),
            story_id: c.story_id.to_string(),
            name: c.name,
            traits: c.traits,
            backstory: c.backstory,
            created_at: c.created_at,
        }
    }
}
