//! Free-form LLM API routes
//!
//! Provider failures come back as `200` with `success: false`.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::dto::{
    ConnectionTestResponseDto, GenerateTextRequestDto, GenerateTextResponseDto,
};
use crate::infrastructure::state::AppState;

pub async fn generate_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateTextRequestDto>,
) -> Json<GenerateTextResponseDto> {
    Json(state.text_generation_service.generate_text(req).await)
}

/// Check that the provider answers with the configured credentials
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
) -> Json<ConnectionTestResponseDto> {
    Json(state.text_generation_service.test_connection().await)
}
