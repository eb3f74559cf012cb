//! Consumer side of a room membership.

use tokio::sync::mpsc;

use super::{Delivery, RoomEvent, RoomId, SubscriptionId};

/// A connection's live membership in one room, together with its event queue.
///
/// Created only by joining a room. Events come out in the order the room
/// produced them; once the terminal marker is reached `recv` keeps returning
/// `None` without touching the queue again.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    room_id: RoomId,
    receiver: mpsc::Receiver<Delivery>,
    finished: bool,
}

impl Subscription {
    pub fn new(id: SubscriptionId, room_id: RoomId, receiver: mpsc::Receiver<Delivery>) -> Self {
        Self {
            id,
            room_id,
            receiver,
            finished: false,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Whether the terminal marker (or a closed queue) has been observed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the subscription has ended: either the terminal
    /// marker was dequeued or every producer is gone. Events queued before the
    /// terminal marker are always returned first.
    pub async fn recv(&mut self) -> Option<RoomEvent> {
        if self.finished {
            return None;
        }

        match self.receiver.recv().await {
            Some(Delivery::Event(event)) => Some(event),
            Some(Delivery::Terminal) | None => {
                self.finished = true;
                self.receiver.close();
                None
            }
        }
    }
}
