//! Character entity - Members of a story's cast, available to every scene

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{CharacterId, StoryId};

/// A character in a story
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub id: CharacterId,
    pub story_id: StoryId,
    pub name: String,
    /// Free-text personality traits
    pub traits: String,
    pub backstory: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Character {
    pub fn new(story_id: StoryId, name: impl Into<String>, traits: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            story_id,
            name: name.into(),
            traits: traits.into(),
            backstory: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = Some(backstory.into());
        self
    }
}
