//! UseCase errors.

use thiserror::Error;

use crate::domain::RoomError;

/// Why a comment was not added
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddCommentError {
    #[error("room '{0}' does not exist")]
    RoomNotFound(String),

    #[error(transparent)]
    Rejected(#[from] RoomError),
}

/// Why the title was not changed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeTitleError {
    #[error("room '{0}' does not exist")]
    RoomNotFound(String),

    #[error(transparent)]
    Rejected(#[from] RoomError),
}

/// Room detail lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room '{0}' does not exist")]
    RoomNotFound(String),
}
