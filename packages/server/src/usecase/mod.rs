//! UseCase layer: the room registry operations.
//!
//! Every mutating use case takes the room lock for the whole operation,
//! broadcast included, so each room sees one total order of mutations.

mod add_comment;
mod change_title;
mod error;
mod get_rooms;
mod join_room;
mod leave_room;

pub use add_comment::AddCommentUseCase;
pub use change_title::ChangeTitleUseCase;
pub use error::{AddCommentError, ChangeTitleError, GetRoomDetailError};
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
