//! tokio の mpsc チャンネルを使った BroadcastHub 実装
//!
//! ## 責務
//!
//! - サブスクリプションごとに容量制限付きキューを生成（subscribe）
//! - ルームのメンバー全員のキューへイベントを投入（broadcast）
//! - 退出したサブスクリプションへ終端マーカーを投入（terminate）
//!
//! ## キューが満杯のとき
//!
//! 送信側は空きができるまで待ちます（イベントは捨てません）。
//! キューは接続ごとに独立しているため、遅い接続が他の接続の順序を乱すことはありません。
//! 受信側が既に破棄されているキューは警告を出してスキップします。

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{
    BroadcastHub, Delivery, Identity, Member, RoomEvent, RoomId, Subscription, SubscriptionId,
};

/// Default bound of each subscription queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// BroadcastHub backed by one bounded mpsc channel per subscription
#[derive(Debug, Clone, Copy)]
pub struct ChannelBroadcastHub {
    queue_capacity: usize,
}

impl ChannelBroadcastHub {
    /// `queue_capacity` is clamped to at least 1.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity: queue_capacity.max(1),
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}

impl Default for ChannelBroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

#[async_trait]
impl BroadcastHub for ChannelBroadcastHub {
    fn subscribe(&self, room_id: &RoomId, identity: Identity) -> (Member, Subscription) {
        let (channel, receiver) = mpsc::channel(self.queue_capacity);
        let subscription_id = SubscriptionId::generate();

        let member = Member {
            subscription_id,
            identity,
            channel,
        };
        let subscription = Subscription::new(subscription_id, room_id.clone(), receiver);
        (member, subscription)
    }

    async fn broadcast(&self, targets: Vec<Member>, event: RoomEvent) {
        for target in targets {
            if target
                .channel
                .send(Delivery::Event(event.clone()))
                .await
                .is_err()
            {
                // ブロードキャストでは一部の送信失敗を許容
                tracing::warn!(
                    "Subscription {} ({}) is gone, skipping event",
                    target.subscription_id,
                    target.identity
                );
            }
        }
    }

    async fn terminate(&self, member: Member) {
        if member.channel.send(Delivery::Terminal).await.is_err() {
            tracing::debug!(
                "Subscription {} already closed before termination",
                member.subscription_id
            );
        }
    }
}
