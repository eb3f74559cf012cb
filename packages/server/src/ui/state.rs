//! Shared application state.

use std::sync::Arc;

use axum::http::HeaderName;
use roomcast_shared::time::Clock;

use crate::{
    config::ServerConfig,
    domain::{BroadcastHub, RoomRepository},
    infrastructure::{broadcast::ChannelBroadcastHub, repository::InMemoryRoomRepository},
    usecase::{
        AddCommentUseCase, ChangeTitleUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub add_comment_usecase: Arc<AddCommentUseCase>,
    pub change_title_usecase: Arc<ChangeTitleUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// Request header carrying the caller identity
    pub identity_header: HeaderName,
    /// Bound of each subscription queue and of each connection's outbound queue
    pub queue_capacity: usize,
}

impl AppState {
    /// Wire the use cases over an in-memory repository and a channel hub.
    ///
    /// Dependencies are created in order:
    /// 1. Repository
    /// 2. BroadcastHub
    /// 3. UseCases
    pub fn in_memory(config: &ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // 1. Create Repository (in-memory database)
        let repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());

        // 2. Create BroadcastHub (bounded queue per subscription)
        let hub: Arc<dyn BroadcastHub> = Arc::new(ChannelBroadcastHub::new(config.queue_capacity));

        // 3. Create UseCases
        Self {
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                hub.clone(),
                clock.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(repository.clone(), hub.clone())),
            add_comment_usecase: Arc::new(AddCommentUseCase::new(
                repository.clone(),
                hub.clone(),
                clock,
            )),
            change_title_usecase: Arc::new(ChangeTitleUseCase::new(repository.clone(), hub)),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository)),
            identity_header: config.identity_header.clone(),
            queue_capacity: config.queue_capacity.max(1),
        }
    }
}
