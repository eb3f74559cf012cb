//! UseCase: ルーム退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - メンバー削除、USER_LEFT の通知、終端マーカーの投入
//!
//! ### なぜこのテストが必要か
//! - 切断時のクリーンアップは何度呼ばれても安全でなければならない
//! - 退出したサブスクリプションの配信ループが確実に一度だけ終了することを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：退出と残りメンバーへの通知
//! - エッジケース：二度目の退出、存在しないルーム、メンバーでないサブスクリプション

use std::sync::Arc;

use crate::domain::{BroadcastHub, RoomEvent, RoomId, RoomRepository, SubscriptionId};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    hub: Arc<dyn BroadcastHub>,
}

impl LeaveRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, hub: Arc<dyn BroadcastHub>) -> Self {
        Self { repository, hub }
    }

    /// ルーム退出を実行
    ///
    /// Unknown rooms and subscriptions that are not (or no longer) members are
    /// a no-op.
    ///
    /// # Returns
    ///
    /// `true` if the subscription was removed by this call
    pub async fn execute(&self, room_id: &RoomId, subscription_id: SubscriptionId) -> bool {
        let Some(room) = self.repository.find(room_id).await else {
            return false;
        };
        let mut room = room.lock().await;

        let Some(member) = room.remove_member(subscription_id) else {
            return false;
        };

        self.hub
            .broadcast(
                room.members().to_vec(),
                RoomEvent::UserLeft(member.identity.clone()),
            )
            .await;

        tracing::debug!(
            "'{}' left room '{}' ({} members remain)",
            member.identity,
            room_id,
            room.members().len()
        );
        self.hub.terminate(member).await;

        true
    }
}
