//! Domain layer: rooms, members, subscriptions and the events they exchange.
//!
//! The traits in this layer (`RoomRepository`, `BroadcastHub`) are implemented
//! by the infrastructure layer and consumed by the use cases.

mod broadcast;
mod entity;
mod error;
mod event;
mod repository;
mod subscription;
mod value_object;

#[cfg(test)]
pub use broadcast::MockBroadcastHub;
pub use broadcast::BroadcastHub;
pub use entity::{Comment, Member, Room, RoomView};
pub use error::{RoomError, ValueObjectError};
pub use event::{Delivery, DeliveryChannel, RoomEvent, RoomSnapshot};
pub use repository::{RoomRepository, SharedRoom};
pub use subscription::Subscription;
pub use value_object::{Identity, RoomId, SubscriptionId, Timestamp};
