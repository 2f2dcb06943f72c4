//! Story entity - The root of the outline hierarchy

use chrono::{DateTime, Utc};

use crate::domain::value_objects::StoryId;

/// Number of chapters every new story starts with
pub const DEFAULT_CHAPTER_COUNT: u32 = 24;

/// A story
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Story {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: StoryId::new(),
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}
