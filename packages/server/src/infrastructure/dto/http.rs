//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::CommentPayload;

/// Room summary for the room list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub title: String,
    pub member_count: usize,
    pub comment_count: usize,
    /// RFC 3339 (UTC)
    pub created_at: String,
}

/// Full room detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub title: String,
    /// Identities of current members, in join order (empty string for anonymous)
    pub members: Vec<String>,
    pub comments: Vec<CommentPayload>,
    /// RFC 3339 (UTC)
    pub created_at: String,
}
