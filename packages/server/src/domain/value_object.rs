//! Value objects of the room domain.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Room identifier.
///
/// Opaque and non-empty. It doubles as the identity of the room's host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the user behind a connection.
///
/// The empty identity stands for an anonymous caller. Anonymous callers may
/// join rooms and watch them but cannot post or rename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this identity owns `room_id`.
    pub fn is_host_of(&self, room_id: &RoomId) -> bool {
        !self.is_anonymous() && self.0 == room_id.as_str()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            f.write_str("<anonymous>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Identifier of a single subscription (one connection's membership in one room).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
