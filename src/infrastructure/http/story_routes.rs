//! Story and chapter API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{parse_path_id, service_error};
use crate::application::dto::{
    ChapterResponseDto, CreateStoryRequestDto, StoryResponseDto, UpdateChapterRequestDto,
    UpdateStoryRequestDto,
};
use crate::domain::value_objects::{ChapterId, StoryId};
use crate::infrastructure::state::AppState;

/// List all stories, newest first
pub async fn list_stories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoryResponseDto>>, (StatusCode, String)> {
    let stories = state
        .story_service
        .list_stories()
        .await
        .map_err(service_error)?;

    Ok(Json(stories.into_iter().map(StoryResponseDto::from).collect()))
}

/// Create a new story with its chapters
pub async fn create_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStoryRequestDto>,
) -> Result<(StatusCode, Json<StoryResponseDto>), (StatusCode, String)> {
    let story = state
        .story_service
        .create_story(&req.title)
        .await
        .map_err(service_error)?;

    Ok((StatusCode::CREATED, Json(StoryResponseDto::from(story))))
}

/// Get a story by ID
pub async fn get_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoryResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "story", StoryId::parse)?;

    let story = state
        .story_service
        .get_story(id)
        .await
        .map_err(service_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Story not found".to_string()))?;

    Ok(Json(StoryResponseDto::from(story)))
}

/// Rename a story
pub async fn update_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStoryRequestDto>,
) -> Result<Json<StoryResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "story", StoryId::parse)?;

    let story = state
        .story_service
        .update_title(id, &req.title)
        .await
        .map_err(service_error)?;

    Ok(Json(StoryResponseDto::from(story)))
}

/// Delete a story and everything in it
pub async fn delete_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_path_id(&id, "story", StoryId::parse)?;

    state
        .story_service
        .delete_story(id)
        .await
        .map_err(service_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// List the chapters of a story
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Path(story_id): Path<String>,
) -> Result<Json<Vec<ChapterResponseDto>>, (StatusCode, String)> {
    let story_id = parse_path_id(&story_id, "story", StoryId::parse)?;

    let chapters = state
        .chapter_service
        .list_chapters(story_id)
        .await
        .map_err(service_error)?;

    Ok(Json(chapters.into_iter().map(ChapterResponseDto::from).collect()))
}

pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ChapterResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "chapter", ChapterId::parse)?;

    let chapter = state
        .chapter_service
        .get_chapter(id)
        .await
        .map_err(service_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Chapter not found".to_string()))?;

    Ok(Json(ChapterResponseDto::from(chapter)))
}

pub async fn update_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateChapterRequestDto>,
) -> Result<Json<ChapterResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "chapter", ChapterId::parse)?;

    let chapter = state
        .chapter_service
        .update_title(id, &req.title)
        .await
        .map_err(service_error)?;

    Ok(Json(ChapterResponseDto::from(chapter)))
}
