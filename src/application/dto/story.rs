use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Chapter, Story};

#[derive(Debug, Deserialize)]
pub struct CreateStoryRequestDto {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStoryRequestDto {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct StoryResponseDto {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<Story> for StoryResponseDto {
    fn from(s: Story) -> Self {
        Self {
            id: s.id.to_string(),
            title: s.title,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateChapterRequestDto {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct ChapterResponseDto {
    pub id: String,
    pub story_id: String,
    pub number: u32,
    pub title: String,
}

impl From<Chapter> for ChapterResponseDto {
    fn from(c: Chapter) -> Self {
        Self {
            id: c.id.to_string(),
            story_id: c.story_id.to_string(),
            number: c.number,
            title: c.title,
        }
    }
}
