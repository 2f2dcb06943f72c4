//! Chapter entity - Ordered container of scenes within a story

use crate::domain::value_objects::{ChapterId, StoryId};

/// A chapter of a story
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: ChapterId,
    pub story_id: StoryId,
    /// 1-based chapter number
    pub number: u32,
    pub title: String,
}

impl Chapter {
    pub fn new(story_id: StoryId, number: u32, title: impl Into<String>) -> Self {
        Self {
            id: ChapterId::new(),
            story_id,
            number,
            title: title.into(),
        }
    }

    /// Chapter created alongside a new story, titled by its number
    pub fn numbered(story_id: StoryId, number: u32) -> Self {
        Self::new(story_id, number, format!("Chapter {}", number))
    }
}
