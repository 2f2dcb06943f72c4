//! Character API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{parse_path_id, service_error};
use crate::application::dto::{
    CharacterResponseDto, CreateCharacterRequestDto, UpdateCharacterRequestDto,
};
use crate::application::services::{CreateCharacterRequest, UpdateCharacterRequest};
use crate::domain::value_objects::{CharacterId, StoryId};
use crate::infrastructure::state::AppState;

/// List the cast of a story
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    Path(story_id): Path<String>,
) -> Result<Json<Vec<CharacterResponseDto>>, (StatusCode, String)> {
    let story_id = parse_path_id(&story_id, "story", StoryId::parse)?;

    let characters = state
        .character_service
        .list_characters(story_id)
        .await
        .map_err(service_error)?;

    Ok(Json(
        characters
            .into_iter()
            .map(CharacterResponseDto::from)
            .collect(),
    ))
}

/// Add a character to a story
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    Path(story_id): Path<String>,
    Json(req): Json<CreateCharacterRequestDto>,
) -> Result<(StatusCode, Json<CharacterResponseDto>), (StatusCode, String)> {
    let story_id = parse_path_id(&story_id, "story", StoryId::parse)?;

    let character = state
        .character_service
        .create_character(
            story_id,
            CreateCharacterRequest {
                name: req.name,
                traits: req.traits,
                backstory: req.backstory,
            },
        )
        .await
        .map_err(service_error)?;

    Ok((StatusCode::CREATED, Json(CharacterResponseDto::from(character))))
}

pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CharacterResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "character", CharacterId::parse)?;

    let character = state
        .character_service
        .get_character(id)
        .await
        .map_err(service_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Character not found".to_string()))?;

    Ok(Json(CharacterResponseDto::from(character)))
}

pub async fn update_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCharacterRequestDto>,
) -> Result<Json<CharacterResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "character", CharacterId::parse)?;

    let character = state
        .character_service
        .update_character(
            id,
            UpdateCharacterRequest {
                name: req.name,
                traits: req.traits,
                backstory: req.backstory,
            },
        )
        .await
        .map_err(service_error)?;

    Ok(Json(CharacterResponseDto::from(character)))
}

pub async fn delete_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_path_id(&id, "character", CharacterId::parse)?;

    state
        .character_service
        .delete_character(id)
        .await
        .map_err(service_error)?;

    Ok(StatusCode::NO_CONTENT)
}
