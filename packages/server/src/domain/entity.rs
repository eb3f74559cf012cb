//! Entities of the room domain.

use super::{
    DeliveryChannel, Identity, RoomError, RoomId, RoomSnapshot, SubscriptionId, Timestamp,
};

/// A comment posted to a room log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub sender: Identity,
    pub text: String,
    pub posted_at: Timestamp,
}

impl Comment {
    pub fn new(sender: Identity, text: impl Into<String>, posted_at: Timestamp) -> Self {
        Self {
            sender,
            text: text.into(),
            posted_at,
        }
    }
}

/// One subscription registered in a room's member set.
#[derive(Debug, Clone)]
pub struct Member {
    pub subscription_id: SubscriptionId,
    pub identity: Identity,
    pub channel: DeliveryChannel,
}

/// A room: title, ordered comment log and the subscriptions currently in it.
///
/// Every mutation goes through `&mut self`, so callers serialize them by
/// holding the room's lock for the whole operation including the broadcast.
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub title: String,
    pub comments: Vec<Comment>,
    pub created_at: Timestamp,
    members: Vec<Member>,
}

/// Read-only copy of a room for inspection endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    pub id: RoomId,
    pub title: String,
    pub comments: Vec<Comment>,
    /// Identities of the current members, in join order.
    pub members: Vec<Identity>,
    pub created_at: Timestamp,
}

impl Room {
    /// A new room has an empty title, no comments and no members.
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            title: String::new(),
            comments: Vec::new(),
            created_at,
            members: Vec::new(),
        }
    }

    /// Current members in join order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, subscription_id: SubscriptionId) -> Option<&Member> {
        self.members
            .iter()
            .find(|member| member.subscription_id == subscription_id)
    }

    pub fn is_member(&self, subscription_id: SubscriptionId) -> bool {
        self.member(subscription_id).is_some()
    }

    /// Register a subscription. Adding an already registered subscription is a no-op.
    pub fn add_member(&mut self, member: Member) {
        if self.is_member(member.subscription_id) {
            return;
        }
        self.members.push(member);
    }

    /// Remove a subscription, returning it if it was a member.
    pub fn remove_member(&mut self, subscription_id: SubscriptionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|member| member.subscription_id == subscription_id)?;
        Some(self.members.remove(index))
    }

    /// Append a comment posted through `subscription_id`.
    pub fn add_comment(
        &mut self,
        subscription_id: SubscriptionId,
        comment: Comment,
    ) -> Result<&Comment, RoomError> {
        if !self.is_member(subscription_id) {
            return Err(RoomError::NotMember);
        }
        if comment.sender.is_anonymous() {
            return Err(RoomError::AnonymousSender);
        }

        self.comments.push(comment);
        Ok(&self.comments[self.comments.len() - 1])
    }

    /// Rename the room on behalf of `subscription_id`, which must belong to the host.
    pub fn change_title(
        &mut self,
        subscription_id: SubscriptionId,
        title: String,
    ) -> Result<(), RoomError> {
        let member = self.member(subscription_id).ok_or(RoomError::NotMember)?;
        if !member.identity.is_host_of(&self.id) {
            return Err(RoomError::NotHost);
        }

        self.title = title;
        Ok(())
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            title: self.title.clone(),
            comments: self.comments.clone(),
        }
    }

    pub fn view(&self) -> RoomView {
        RoomView {
            id: self.id.clone(),
            title: self.title.clone(),
            comments: self.comments.clone(),
            members: self
                .members
                .iter()
                .map(|member| member.identity.clone())
                .collect(),
            created_at: self.created_at,
        }
    }
}
