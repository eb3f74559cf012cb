//! WebSocket message DTOs.
//!
//! Every frame, in both directions, is one JSON object:
//!
//! ```text
//! { "type": "<MESSAGE_TYPE>", "payload": <type specific> }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const JOIN: &str = "JOIN";
pub const LEAVE: &str = "LEAVE";
pub const ADD_COMMENT: &str = "ADD_COMMENT";
pub const CHANGE_TITLE: &str = "CHANGE_TITLE";

/// Frames that cannot be turned into an inbound message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not a message envelope: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),

    #[error("{message_type} expects a string payload")]
    InvalidPayload { message_type: &'static str },
}

/// Raw envelope as read from the socket.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub r#type: String,
    #[serde(default)]
    pub payload: Value,
}

/// Client → server messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Payload: room id
    Join(String),
    Leave,
    /// Payload: comment text
    AddComment(String),
    /// Payload: new title
    ChangeTitle(String),
    /// Any other `type`; ignored by the session.
    Unknown(String),
}

impl InboundMessage {
    /// Decode a text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Self::from_envelope(envelope)
    }

    /// Decode a binary frame holding the same JSON.
    pub fn decode_slice(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_slice(bytes)?;
        Self::from_envelope(envelope)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self, ProtocolError> {
        let message = match envelope.r#type.as_str() {
            JOIN => Self::Join(string_payload(JOIN, envelope.payload)?),
            LEAVE => Self::Leave,
            ADD_COMMENT => Self::AddComment(string_payload(ADD_COMMENT, envelope.payload)?),
            CHANGE_TITLE => Self::ChangeTitle(string_payload(CHANGE_TITLE, envelope.payload)?),
            _ => Self::Unknown(envelope.r#type),
        };
        Ok(message)
    }
}

fn string_payload(message_type: &'static str, payload: Value) -> Result<String, ProtocolError> {
    match payload {
        Value::String(value) => Ok(value),
        _ => Err(ProtocolError::InvalidPayload { message_type }),
    }
}

/// A comment as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub sender_id: String,
    pub text: String,
    /// Unix timestamp in milliseconds
    pub posted_at: i64,
}

/// Room state sent once right after a successful join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDataPayload {
    pub title: String,
    pub comments: Vec<CommentPayload>,
}

/// Server → client messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    RoomData(RoomDataPayload),
    CommentAdded(CommentPayload),
    /// Payload: identity of the member who joined (empty when anonymous)
    UserJoined(String),
    /// Payload: identity of the member who left (empty when anonymous)
    UserLeft(String),
    /// Payload: the new title
    TitleChanged(String),
}
