//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## ロックの粒度
//!
//! ```text
//! RwLock<HashMap<RoomId, Arc<Mutex<Room>>>>
//!   └─ map のロック: 検索と挿入の間だけ保持（await を挟まない）
//!        └─ room のロック: ルーム単位の操作全体（ブロードキャストを含む）で保持
//! ```
//!
//! map のロックはルームのロックを待つ間は決して保持しないため、
//! 別ルームの操作が互いを待つことはありません。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{Room, RoomId, RoomRepository, SharedRoom, Timestamp};

/// インメモリ Room Repository 実装
///
/// 一度でも参加されたルームは削除されず、プロセス終了まで保持されます。
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<RoomId, SharedRoom>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_or_create(&self, room_id: &RoomId, created_at: Timestamp) -> SharedRoom {
        if let Some(room) = self.rooms.read().await.get(room_id) {
            return Arc::clone(room);
        }

        // Another caller may have created it between the two locks.
        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!("Room '{}' created", room_id);
            Arc::new(Mutex::new(Room::new(room_id.clone(), created_at)))
        });
        Arc::clone(room)
    }

    async fn find(&self, room_id: &RoomId) -> Option<SharedRoom> {
        self.rooms.read().await.get(room_id).cloned()
    }

    async fn list(&self) -> Vec<SharedRoom> {
        let rooms = self.rooms.read().await;
        let mut entries: Vec<(&RoomId, &SharedRoom)> = rooms.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
            .into_iter()
            .map(|(_, room)| Arc::clone(room))
            .collect()
    }

    async fn count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
