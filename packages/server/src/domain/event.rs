//! Events fanned out to room members.

use tokio::sync::mpsc;

use super::{Comment, Identity};

/// Immutable view of a room handed to a connection right after it joins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomSnapshot {
    pub title: String,
    pub comments: Vec<Comment>,
}

/// Something that happened in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// Current state of the room; only ever sent to the joiner itself.
    Snapshot(RoomSnapshot),
    CommentAdded(Comment),
    UserJoined(Identity),
    UserLeft(Identity),
    TitleChanged(String),
}

/// One item on a subscription queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Event(RoomEvent),
    /// Nothing follows this item; the delivery loop must stop.
    Terminal,
}

/// Producer side of a subscription queue.
pub type DeliveryChannel = mpsc::Sender<Delivery>;
