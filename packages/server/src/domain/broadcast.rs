//! Delivery of room events to member subscriptions.
//!
//! The infrastructure layer provides the implementation (`ChannelBroadcastHub`).

use async_trait::async_trait;

use super::{Identity, Member, RoomEvent, RoomId, Subscription};

/// Fan-out of room events to member subscriptions.
///
/// Callers hold the room lock while calling `broadcast` and `terminate`, so
/// every queue receives a room's events in the same order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BroadcastHub: Send + Sync {
    /// Create a subscription for `identity` in `room_id`.
    ///
    /// Returns the producer half to register in the room and the consumer
    /// half for the connection. Both share one freshly generated id.
    fn subscribe(&self, room_id: &RoomId, identity: Identity) -> (Member, Subscription);

    /// Enqueue `event` on every target's queue, in order.
    ///
    /// Waits for space on full queues. Targets whose consumer is gone are
    /// skipped.
    async fn broadcast(&self, targets: Vec<Member>, event: RoomEvent);

    /// Enqueue the terminal marker as the last item for `member`.
    async fn terminate(&self, member: Member);
}
