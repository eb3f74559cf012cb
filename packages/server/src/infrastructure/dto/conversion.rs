//! Conversion logic between DTOs and domain entities.

use roomcast_shared::time::timestamp_to_rfc3339;

use crate::domain::{Comment, RoomEvent, RoomSnapshot, RoomView};
use crate::infrastructure::dto::{
    http::{RoomDetailDto, RoomSummaryDto},
    websocket::{CommentPayload, OutboundMessage, RoomDataPayload},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Comment> for CommentPayload {
    fn from(comment: Comment) -> Self {
        Self {
            sender_id: comment.sender.into_string(),
            text: comment.text,
            posted_at: comment.posted_at.value(),
        }
    }
}

impl From<RoomSnapshot> for RoomDataPayload {
    fn from(snapshot: RoomSnapshot) -> Self {
        Self {
            title: snapshot.title,
            comments: snapshot.comments.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RoomEvent> for OutboundMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::Snapshot(snapshot) => Self::RoomData(snapshot.into()),
            RoomEvent::CommentAdded(comment) => Self::CommentAdded(comment.into()),
            RoomEvent::UserJoined(identity) => Self::UserJoined(identity.into_string()),
            RoomEvent::UserLeft(identity) => Self::UserLeft(identity.into_string()),
            RoomEvent::TitleChanged(title) => Self::TitleChanged(title),
        }
    }
}

impl From<RoomView> for RoomSummaryDto {
    fn from(view: RoomView) -> Self {
        Self {
            id: view.id.into_string(),
            title: view.title,
            member_count: view.members.len(),
            comment_count: view.comments.len(),
            created_at: timestamp_to_rfc3339(view.created_at.value()),
        }
    }
}

impl From<RoomView> for RoomDetailDto {
    fn from(view: RoomView) -> Self {
        Self {
            id: view.id.into_string(),
            title: view.title,
            members: view.members.into_iter().map(|m| m.into_string()).collect(),
            comments: view.comments.into_iter().map(Into::into).collect(),
            created_at: timestamp_to_rfc3339(view.created_at.value()),
        }
    }
}
