//! Scene API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{parse_path_id, service_error};
use crate::application::dto::{
    CreateSceneRequestDto, GenerateSceneRequestDto, GenerateSceneResponseDto,
    MoveSceneRequestDto, SceneResponseDto, UpdateSceneRequestDto, UpdateSceneStatusRequestDto,
};
use crate::application::services::UpdateSceneRequest;
use crate::domain::value_objects::{ChapterId, SceneId};
use crate::infrastructure::state::AppState;

/// List scenes in a chapter, ordered by position
pub async fn list_scenes(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<String>,
) -> Result<Json<Vec<SceneResponseDto>>, (StatusCode, String)> {
    let chapter_id = parse_path_id(&chapter_id, "chapter", ChapterId::parse)?;

    let scenes = state
        .scene_service
        .list_scenes(chapter_id)
        .await
        .map_err(service_error)?;

    Ok(Json(scenes.into_iter().map(SceneResponseDto::from).collect()))
}

/// Append a scene to a chapter
pub async fn create_scene(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<String>,
    Json(req): Json<CreateSceneRequestDto>,
) -> Result<(StatusCode, Json<SceneResponseDto>), (StatusCode, String)> {
    let chapter_id = parse_path_id(&chapter_id, "chapter", ChapterId::parse)?;

    let scene = state
        .scene_service
        .create_scene(chapter_id, &req.outline)
        .await
        .map_err(service_error)?;

    Ok((StatusCode::CREATED, Json(SceneResponseDto::from(scene))))
}

pub async fn get_scene(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SceneResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "scene", SceneId::parse)?;

    let scene = state
        .scene_service
        .get_scene(id)
        .await
        .map_err(service_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Scene not found".to_string()))?;

    Ok(Json(SceneResponseDto::from(scene)))
}

/// Edit a scene's outline and/or prose
pub async fn update_scene(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSceneRequestDto>,
) -> Result<Json<SceneResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "scene", SceneId::parse)?;

    let scene = state
        .scene_service
        .update_scene(
            id,
            UpdateSceneRequest {
                outline: req.outline,
                prose: req.prose,
            },
        )
        .await
        .map_err(service_error)?;

    Ok(Json(SceneResponseDto::from(scene)))
}

pub async fn delete_scene(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_path_id(&id, "scene", SceneId::parse)?;

    state
        .scene_service
        .delete_scene(id)
        .await
        .map_err(service_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Move a scene to a new position within its chapter
pub async fn move_scene(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<MoveSceneRequestDto>,
) -> Result<Json<SceneResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "scene", SceneId::parse)?;

    let scene = state
        .scene_service
        .move_scene(id, req.position)
        .await
        .map_err(service_error)?;

    Ok(Json(SceneResponseDto::from(scene)))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSceneStatusRequestDto>,
) -> Result<Json<SceneResponseDto>, (StatusCode, String)> {
    let id = parse_path_id(&id, "scene", SceneId::parse)?;

    let scene = state
        .scene_service
        .set_status(id, req.status, req.error_message)
        .await
        .map_err(service_error)?;

    Ok(Json(SceneResponseDto::from(scene)))
}

/// Queue prose generation for a scene
///
/// Returns as soon as the job is queued; clients poll the scene's status.
pub async fn generate_scene(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GenerateSceneRequestDto>,
) -> Result<(StatusCode, Json<GenerateSceneResponseDto>), (StatusCode, String)> {
    let id = parse_path_id(&id, "scene", SceneId::parse)?;

    state
        .scene_service
        .request_generation(id, &req.outline)
        .await
        .map_err(service_error)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateSceneResponseDto { success: true }),
    ))
}
