//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルームの遅延生成、スナップショット、USER_JOINED の通知
//!
//! ### なぜこのテストが必要か
//! - 参加直後に表示する状態（タイトルとコメントログ）が正しいことを保証
//! - 参加者自身には USER_JOINED が届かないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：初めての参加でルームが作成される
//! - 正常系：既存メンバーへの通知
//! - エッジケース：同じ Identity による複数接続

use std::sync::Arc;

use roomcast_shared::time::Clock;

use crate::domain::{
    BroadcastHub, Identity, RoomEvent, RoomId, RoomRepository, RoomSnapshot, Subscription,
    Timestamp,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    hub: Arc<dyn BroadcastHub>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
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

    /// ルーム参加を実行
    ///
    /// Creates the room on first join. The snapshot, the new membership and the
    /// `USER_JOINED` broadcast to the members already present all happen under
    /// the room lock, so the joiner neither misses nor duplicates any event.
    ///
    /// # Returns
    ///
    /// The new subscription and the room state at the moment of joining
    pub async fn execute(&self, room_id: RoomId, identity: Identity) -> (Subscription, RoomSnapshot) {
        let created_at = Timestamp::new(self.clock.now_millis());
        let room = self.repository.get_or_create(&room_id, created_at).await;
        let mut room = room.lock().await;

        let (member, subscription) = self.hub.subscribe(&room_id, identity.clone());
        let snapshot = room.snapshot();

        // 参加者本人を追加する前に通知する（本人には届かない）
        self.hub
            .broadcast(room.members().to_vec(), RoomEvent::UserJoined(identity.clone()))
            .await;
        room.add_member(member);

        tracing::debug!(
            "'{}' joined room '{}' as subscription {} ({} members)",
            identity,
            room_id,
            subscription.id(),
            room.members().len()
        );

        (subscription, snapshot)
    }
}
