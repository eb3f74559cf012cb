//! UseCase: ルームタイトル変更処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChangeTitleUseCase::execute() メソッド
//! - ホストだけがタイトルを変更でき、全メンバーに TITLE_CHANGED が届くこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：ホストによる変更
//! - 異常系：ホスト以外、メンバーでないサブスクリプション

use std::sync::Arc;

use crate::domain::{BroadcastHub, RoomEvent, RoomId, RoomRepository, SubscriptionId};

use super::error::ChangeTitleError;

/// タイトル変更のユースケース
pub struct ChangeTitleUseCase {
    repository: Arc<dyn RoomRepository>,
    hub: Arc<dyn BroadcastHub>,
}

impl ChangeTitleUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, hub: Arc<dyn BroadcastHub>) -> Self {
        Self { repository, hub }
    }

    /// タイトル変更を実行
    ///
    /// The caller is identified by the member registered under
    /// `subscription_id`; it must be the host (identity equal to `room_id`).
    pub async fn execute(
        &self,
        room_id: &RoomId,
        subscription_id: SubscriptionId,
        title: String,
    ) -> Result<(), ChangeTitleError> {
        let room = self
            .repository
            .find(room_id)
            .await
            .ok_or_else(|| ChangeTitleError::RoomNotFound(room_id.to_string()))?;
        let mut room = room.lock().await;

        room.change_title(subscription_id, title.clone())?;
        tracing::debug!("Room '{}' renamed to '{}'", room_id, title);

        self.hub
            .broadcast(room.members().to_vec(), RoomEvent::TitleChanged(title))
            .await;

        Ok(())
    }
}
