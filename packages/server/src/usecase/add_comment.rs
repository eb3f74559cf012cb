//! UseCase: コメント投稿処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AddCommentUseCase::execute() メソッド
//! - コメントログへの追加と COMMENT_ADDED の通知（投稿者本人を含む）
//!
//! ### なぜこのテストが必要か
//! - 全メンバーが同じコメントログを見ることを保証
//! - 認可されない投稿が何の副作用も残さないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：投稿者を含む全メンバーへのエコー
//! - 異常系：匿名の投稿者、メンバーでないサブスクリプション、存在しないルーム

use std::sync::Arc;

use roomcast_shared::time::Clock;

use crate::domain::{
    BroadcastHub, Comment, Identity, RoomEvent, RoomId, RoomRepository, SubscriptionId, Timestamp,
};

use super::error::AddCommentError;

/// コメント投稿のユースケース
pub struct AddCommentUseCase {
    repository: Arc<dyn RoomRepository>,
    hub: Arc<dyn BroadcastHub>,
    clock: Arc<dyn Clock>,
}

impl AddCommentUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        hub: Arc<dyn BroadcastHub>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            hub,
            clock,
        }
    }

    /// コメント投稿を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 投稿先のルーム
    /// * `subscription_id` - 投稿者のサブスクリプション（ルームのメンバーであること）
    /// * `sender` - 投稿者の Identity（匿名不可）
    /// * `text` - 本文（検証しない）
    ///
    /// # Returns
    ///
    /// * `Ok(Comment)` - ログに追加され、全メンバーに通知されたコメント
    /// * `Err(AddCommentError)` - 何も変更されず、何も通知されていない
    pub async fn execute(
        &self,
        room_id: &RoomId,
        subscription_id: SubscriptionId,
        sender: Identity,
        text: String,
    ) -> Result<Comment, AddCommentError> {
        let room = self
            .repository
            .find(room_id)
            .await
            .ok_or_else(|| AddCommentError::RoomNotFound(room_id.to_string()))?;
        let mut room = room.lock().await;

        let comment = Comment::new(sender, text, Timestamp::new(self.clock.now_millis()));
        let comment = room.add_comment(subscription_id, comment)?.clone();

        self.hub
            .broadcast(
                room.members().to_vec(),
                RoomEvent::CommentAdded(comment.clone()),
            )
            .await;

        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Member, MockBroadcastHub, RoomError},
        infrastructure::{broadcast::ChannelBroadcastHub, repository::InMemoryRoomRepository},
        usecase::JoinRoomUseCase,
    };
    use roomcast_shared::time::FixedClock;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn room_id(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    /// Registers a bare member directly in the repository.
    async fn insert_member(
        repository: &InMemoryRoomRepository,
        room: &str,
        identity: &str,
    ) -> SubscriptionId {
        let (channel, _receiver) = mpsc::channel(1);
        let member = Member {
            subscription_id: SubscriptionId::generate(),
            identity: Identity::new(identity),
            channel,
        };
        let subscription_id = member.subscription_id;
        let room = repository.get_or_create(&room_id(room), Timestamp::new(0)).await;
        room.lock().await.add_member(member);
        subscription_id
    }

    #[tokio::test]
    async fn test_comment_is_echoed_to_every_member() {
        // テスト項目: コメントは投稿者本人を含む全メンバーに届き、ログの末尾に追加される
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let hub = Arc::new(ChannelBroadcastHub::default());
        let clock = Arc::new(FixedClock::new(4242));
        let join = JoinRoomUseCase::new(repository.clone(), hub.clone(), clock.clone());
        let usecase = AddCommentUseCase::new(repository.clone(), hub, clock);
        let (mut host, _) = join.execute(room_id("r1"), Identity::new("r1")).await;
        let (mut sender, _) = join.execute(room_id("r1"), Identity::new("u1")).await;
        host.recv().await; // USER_JOINED u1

        // when (操作):
        let result = usecase
            .execute(&room_id("r1"), sender.id(), Identity::new("u1"), "hi".to_string())
            .await;

        // then (期待する結果):
        let expected = Comment::new(Identity::new("u1"), "hi", Timestamp::new(4242));
        assert_eq!(result, Ok(expected.clone()));
        assert_eq!(host.recv().await, Some(RoomEvent::CommentAdded(expected.clone())));
        assert_eq!(sender.recv().await, Some(RoomEvent::CommentAdded(expected.clone())));
        let room = repository.find(&room_id("r1")).await.unwrap();
        assert_eq!(room.lock().await.comments.last(), Some(&expected));
    }

    #[tokio::test]
    async fn test_anonymous_sender_is_rejected_without_broadcast() {
        // テスト項目: 匿名の投稿は拒否され、ログにもブロードキャストにも影響しない
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let subscription_id = insert_member(&repository, "r1", "").await;
        let mut hub = MockBroadcastHub::new();
        hub.expect_broadcast().never();
        let usecase =
            AddCommentUseCase::new(repository.clone(), Arc::new(hub), Arc::new(FixedClock::new(0)));

        // when (操作):
        let result = usecase
            .execute(&room_id("r1"), subscription_id, Identity::anonymous(), "hi".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(AddCommentError::Rejected(RoomError::AnonymousSender)));
        let room = repository.find(&room_id("r1")).await.unwrap();
        assert!(room.lock().await.comments.is_empty());
    }

    #[tokio::test]
    async fn test_non_member_is_rejected_without_broadcast() {
        // テスト項目: メンバーでないサブスクリプションからの投稿は拒否される
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        insert_member(&repository, "r1", "u1").await;
        let mut hub = MockBroadcastHub::new();
        hub.expect_broadcast().never();
        let usecase =
            AddCommentUseCase::new(repository.clone(), Arc::new(hub), Arc::new(FixedClock::new(0)));

        // when (操作):
        let result = usecase
            .execute(
                &room_id("r1"),
                SubscriptionId::generate(),
                Identity::new("u1"),
                "hi".to_string(),
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(AddCommentError::Rejected(RoomError::NotMember)));
    }

    #[tokio::test]
    async fn test_unknown_room_is_rejected() {
        // テスト項目: 存在しないルームへの投稿はルームを作成せずに拒否される
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let usecase = AddCommentUseCase::new(
            repository.clone(),
            Arc::new(MockBroadcastHub::new()),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作):
        let result = usecase
            .execute(
                &room_id("ghost"),
                SubscriptionId::generate(),
                Identity::new("u1"),
                "hi".to_string(),
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(AddCommentError::RoomNotFound("ghost".to_string())));
        assert_eq!(repository.count().await, 0);
    }

    #[tokio::test]
    async fn test_saturated_room_does_not_block_other_rooms() {
        // テスト項目: キューが満杯で投稿が待たされているルームがあっても、別ルームへの投稿は完了する
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let hub = Arc::new(ChannelBroadcastHub::new(1));
        let clock = Arc::new(FixedClock::new(0));
        let join = JoinRoomUseCase::new(repository.clone(), hub.clone(), clock.clone());
        let usecase = Arc::new(AddCommentUseCase::new(repository.clone(), hub, clock));
        // a のメンバーはキューを一切読まない
        let (stalled, _) = join.execute(room_id("a"), Identity::new("u1")).await;
        let (active, _) = join.execute(room_id("b"), Identity::new("u2")).await;
        usecase
            .execute(&room_id("a"), stalled.id(), Identity::new("u1"), "fills".to_string())
            .await
            .unwrap();

        // when (操作):
        let blocked = tokio::spawn({
            let usecase = usecase.clone();
            let subscription_id = stalled.id();
            async move {
                usecase
                    .execute(&room_id("a"), subscription_id, Identity::new("u1"), "waits".to_string())
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let other = tokio::time::timeout(
            Duration::from_secs(1),
            usecase.execute(&room_id("b"), active.id(), Identity::new("u2"), "free".to_string()),
        )
        .await;

        // then (期待する結果):
        assert!(!blocked.is_finished());
        assert!(matches!(other, Ok(Ok(_))));

        drop(stalled);
        let released = tokio::time::timeout(Duration::from_secs(1), blocked).await;
        assert!(matches!(released, Ok(Ok(Ok(_)))));
    }
}
