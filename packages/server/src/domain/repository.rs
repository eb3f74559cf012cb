//! Storage of rooms, keyed by id.
//!
//! The infrastructure layer provides the implementation (`InMemoryRoomRepository`).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Room, RoomId, Timestamp};

/// A room behind its own lock.
///
/// Everything that reads or mutates one room happens while holding this lock,
/// which is what makes operations on a single room linearizable.
pub type SharedRoom = Arc<Mutex<Room>>;

/// Room Repository trait
///
/// Implementations must never hold a lock shared between rooms while a room
/// lock is held, so that unrelated rooms never wait on each other.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Look up a room, creating it with `created_at` if it does not exist yet.
    async fn get_or_create(&self, room_id: &RoomId, created_at: Timestamp) -> SharedRoom;

    /// Look up an existing room.
    async fn find(&self, room_id: &RoomId) -> Option<SharedRoom>;

    /// All rooms, sorted by id.
    async fn list(&self) -> Vec<SharedRoom>;

    /// Number of rooms ever joined.
    async fn count(&self) -> usize;
}
