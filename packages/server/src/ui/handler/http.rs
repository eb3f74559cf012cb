//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::GetRoomDetailError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::try_from(room_id).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.get_room_detail_usecase.execute(&room_id).await {
        Ok(room) => Ok(Json(RoomDetailDto::from(room))),
        Err(GetRoomDetailError::RoomNotFound(id)) => {
            tracing::debug!("Room '{}' not found", id);
            Err(StatusCode::NOT_FOUND)
        }
    }
}
