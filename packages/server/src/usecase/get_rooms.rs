//! UseCase: ルーム一覧・詳細の取得

use std::sync::Arc;

use crate::domain::{RoomId, RoomRepository, RoomView};

use super::error::GetRoomDetailError;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// All rooms, sorted by id.
    ///
    /// Each room is copied under its own lock, one at a time.
    pub async fn execute(&self) -> Vec<RoomView> {
        let mut views = Vec::new();
        for room in self.repository.list().await {
            views.push(room.lock().await.view());
        }
        views
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<RoomView, GetRoomDetailError> {
        let room = self
            .repository
            .find(room_id)
            .await
            .ok_or_else(|| GetRoomDetailError::RoomNotFound(room_id.to_string()))?;
        let view = room.lock().await.view();
        Ok(view)
    }
}
