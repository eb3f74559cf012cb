//! Domain errors.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    RoomIdEmpty,
}

/// Reasons a room refuses a mutation.
///
/// These are authorization refusals, not failures: the room is left unchanged
/// and no event is broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("subscription is not a member of the room")]
    NotMember,

    #[error("anonymous callers cannot post comments")]
    AnonymousSender,

    #[error("only the host can change the room title")]
    NotHost,
}
