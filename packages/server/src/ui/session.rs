//! Per-connection session: which room (if any) the connection is joined to.
//!
//! A session is either `Idle` or `Joined`. While joined, a delivery task
//! forwards the subscription's events into the connection's outbound queue,
//! which the WebSocket writer drains. Both queues are bounded: a stalled
//! socket fills the outbound queue, the delivery task stops pulling, the
//! subscription queue fills and broadcasters to that room wait.

use std::sync::Arc;

use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{Identity, RoomEvent, RoomId, Subscription, SubscriptionId},
    infrastructure::dto::websocket::{InboundMessage, OutboundMessage, ProtocolError},
    ui::state::AppState,
};

/// Errors that end a connection.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("outbound writer is closed")]
    OutboundClosed,
    #[error("websocket transport error: {0}")]
    Transport(#[from] axum::Error),
}

/// Session state
#[derive(Debug)]
pub enum SessionState {
    Idle,
    Joined {
        room_id: RoomId,
        subscription_id: SubscriptionId,
        delivery: JoinHandle<()>,
    },
}

pub struct ConnectionSession {
    identity: Identity,
    state: SessionState,
    app: Arc<AppState>,
    outbound: mpsc::Sender<OutboundMessage>,
}

impl ConnectionSession {
    pub fn new(
        identity: Identity,
        app: Arc<AppState>,
        outbound: mpsc::Sender<OutboundMessage>,
    ) -> Self {
        Self {
            identity,
            state: SessionState::Idle,
            app,
            outbound,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_room(&self) -> Option<&RoomId> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Joined { room_id, .. } => Some(room_id),
        }
    }

    /// Apply one decoded client message.
    ///
    /// Only a closed outbound queue is reported as an error; rejected
    /// commands are dropped here and logged.
    pub async fn handle(&mut self, message: InboundMessage) -> Result<(), SessionError> {
        match message {
            InboundMessage::Join(room_id) => self.join(room_id).await,
            InboundMessage::Leave => {
                self.leave().await;
                Ok(())
            }
            InboundMessage::AddComment(text) => {
                self.add_comment(text).await;
                Ok(())
            }
            InboundMessage::ChangeTitle(title) => {
                self.change_title(title).await;
                Ok(())
            }
            InboundMessage::Unknown(message_type) => {
                tracing::debug!(
                    "Ignoring unknown message type '{}' from '{}'",
                    message_type,
                    self.identity
                );
                Ok(())
            }
        }
    }

    async fn join(&mut self, raw_room_id: String) -> Result<(), SessionError> {
        // 別ルームへの JOIN は暗黙の LEAVE を伴う
        self.leave().await;

        let room_id = match RoomId::try_from(raw_room_id) {
            Ok(room_id) => room_id,
            Err(e) => {
                tracing::warn!("JOIN from '{}' ignored: {}", self.identity, e);
                return Ok(());
            }
        };

        let (subscription, snapshot) = self
            .app
            .join_room_usecase
            .execute(room_id.clone(), self.identity.clone())
            .await;
        let subscription_id = subscription.id();

        // ROOM_DATA は配信ループより先にキューへ積む
        let sent = self
            .outbound
            .send(OutboundMessage::from(RoomEvent::Snapshot(snapshot)))
            .await;
        let delivery = spawn_delivery_loop(subscription, self.outbound.clone());

        tracing::info!("'{}' joined room '{}'", self.identity, room_id);
        self.state = SessionState::Joined {
            room_id,
            subscription_id,
            delivery,
        };

        sent.map_err(|_| SessionError::OutboundClosed)
    }

    /// Leave the current room, if any.
    ///
    /// Returns once the delivery task has forwarded every event that was
    /// queued before the removal, so frames from the old room never follow
    /// anything sent afterwards.
    pub async fn leave(&mut self) {
        let SessionState::Joined {
            room_id,
            subscription_id,
            delivery,
        } = std::mem::replace(&mut self.state, SessionState::Idle)
        else {
            return;
        };

        let removed = self
            .app
            .leave_room_usecase
            .execute(&room_id, subscription_id)
            .await;
        if !removed {
            // No terminal marker will arrive
            delivery.abort();
        }

        if let Err(e) = delivery.await
            && !e.is_cancelled()
        {
            tracing::warn!("Delivery task for room '{}' failed: {}", room_id, e);
        }
        tracing::info!("'{}' left room '{}'", self.identity, room_id);
    }

    /// Tear the session down at end of connection. Idempotent.
    pub async fn close(&mut self) {
        self.leave().await;
    }

    async fn add_comment(&self, text: String) {
        let SessionState::Joined {
            room_id,
            subscription_id,
            ..
        } = &self.state
        else {
            tracing::debug!("ADD_COMMENT from '{}' dropped: not in a room", self.identity);
            return;
        };
        if self.identity.is_anonymous() {
            tracing::debug!("ADD_COMMENT dropped: anonymous sender in '{}'", room_id);
            return;
        }

        if let Err(e) = self
            .app
            .add_comment_usecase
            .execute(room_id, *subscription_id, self.identity.clone(), text)
            .await
        {
            tracing::debug!("ADD_COMMENT from '{}' dropped: {}", self.identity, e);
        }
    }

    async fn change_title(&self, title: String) {
        let SessionState::Joined {
            room_id,
            subscription_id,
            ..
        } = &self.state
        else {
            tracing::debug!("CHANGE_TITLE from '{}' dropped: not in a room", self.identity);
            return;
        };
        if !self.identity.is_host_of(room_id) {
            tracing::debug!(
                "CHANGE_TITLE from '{}' dropped: not the host of '{}'",
                self.identity,
                room_id
            );
            return;
        }

        if let Err(e) = self
            .app
            .change_title_usecase
            .execute(room_id, *subscription_id, title)
            .await
        {
            tracing::debug!("CHANGE_TITLE from '{}' dropped: {}", self.identity, e);
        }
    }
}

fn spawn_delivery_loop(
    mut subscription: Subscription,
    outbound: mpsc::Sender<OutboundMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            // 書き込み側が詰まっている間はここで待ち、サブスクリプションのキューに溜める
            if outbound.send(OutboundMessage::from(event)).await.is_err() {
                break;
            }
        }
        tracing::debug!(
            "Delivery for subscription {} in room '{}' finished",
            subscription.id(),
            subscription.room_id()
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ServerConfig, infrastructure::dto::websocket::RoomDataPayload};
    use roomcast_shared::time::FixedClock;
    use std::time::Duration;
    use tokio::time::timeout;

    fn app() -> Arc<AppState> {
        Arc::new(AppState::in_memory(
            &ServerConfig::default(),
            Arc::new(FixedClock::new(1_000)),
        ))
    }

    fn session(
        app: &Arc<AppState>,
        identity: Identity,
    ) -> (ConnectionSession, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(app.queue_capacity);
        (ConnectionSession::new(identity, app.clone(), tx), rx)
    }

    async fn next(rx: &mut mpsc::Receiver<OutboundMessage>) -> OutboundMessage {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for outbound message")
            .expect("outbound channel closed")
    }

    async fn assert_silent(rx: &mut mpsc::Receiver<OutboundMessage>) {
        assert!(
            timeout(Duration::from_millis(50), rx.recv()).await.is_err(),
            "unexpected outbound message"
        );
    }

    fn empty_room_data() -> OutboundMessage {
        OutboundMessage::RoomData(RoomDataPayload {
            title: String::new(),
            comments: vec![],
        })
    }

    #[tokio::test]
    async fn test_join_sends_room_data_first() {
        // テスト項目: JOIN すると最初に ROOM_DATA が届き、状態が Joined になる
        // given (前提条件):
        let app = app();
        let (mut alice, mut rx) = session(&app, Identity::new("alice"));

        // when (操作):
        alice
            .handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(next(&mut rx).await, empty_room_data());
        assert_eq!(alice.current_room().map(RoomId::as_str), Some("alice"));
    }

    #[tokio::test]
    async fn test_join_with_empty_room_id_stays_idle() {
        // テスト項目: 空のルーム ID への JOIN は無視され、Idle のまま
        // given (前提条件):
        let app = app();
        let (mut alice, mut rx) = session(&app, Identity::new("alice"));

        // when (操作):
        let result = alice.handle(InboundMessage::Join(String::new())).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(matches!(alice.state(), SessionState::Idle));
        assert_silent(&mut rx).await;
    }

    #[tokio::test]
    async fn test_other_member_sees_join_comment_and_leave() {
        // テスト項目: 既存メンバーには USER_JOINED, COMMENT_ADDED, USER_LEFT が順に届く
        // given (前提条件):
        let app = app();
        let (mut alice, mut alice_rx) = session(&app, Identity::new("alice"));
        let (mut bob, mut bob_rx) = session(&app, Identity::new("bob"));
        alice
            .handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();
        next(&mut alice_rx).await;

        // when (操作):
        bob.handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();
        bob.handle(InboundMessage::AddComment("hi".to_string()))
            .await
            .unwrap();
        bob.handle(InboundMessage::Leave).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            next(&mut alice_rx).await,
            OutboundMessage::UserJoined("bob".to_string())
        );
        match next(&mut alice_rx).await {
            OutboundMessage::CommentAdded(comment) => {
                assert_eq!(comment.sender_id, "bob");
                assert_eq!(comment.text, "hi");
                assert_eq!(comment.posted_at, 1_000);
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(
            next(&mut alice_rx).await,
            OutboundMessage::UserLeft("bob".to_string())
        );

        // bob 自身には ROOM_DATA と自分のコメントだけが届く
        assert_eq!(next(&mut bob_rx).await, empty_room_data());
        assert!(matches!(
            next(&mut bob_rx).await,
            OutboundMessage::CommentAdded(_)
        ));
        assert_silent(&mut bob_rx).await;
        assert!(matches!(bob.state(), SessionState::Idle));
    }

    #[tokio::test]
    async fn test_anonymous_comment_is_dropped() {
        // テスト項目: 匿名ユーザーの ADD_COMMENT は誰にも配信されない
        // given (前提条件):
        let app = app();
        let (mut alice, mut alice_rx) = session(&app, Identity::new("alice"));
        let (mut guest, mut guest_rx) = session(&app, Identity::anonymous());
        alice
            .handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();
        guest
            .handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();
        next(&mut alice_rx).await;
        next(&mut alice_rx).await;
        next(&mut guest_rx).await;

        // when (操作):
        guest
            .handle(InboundMessage::AddComment("spam".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_silent(&mut alice_rx).await;
        assert_silent(&mut guest_rx).await;
    }

    #[tokio::test]
    async fn test_comment_while_idle_is_dropped() {
        // テスト項目: どのルームにも参加していない ADD_COMMENT / CHANGE_TITLE は無視される
        // given (前提条件):
        let app = app();
        let (mut alice, mut rx) = session(&app, Identity::new("alice"));

        // when (操作):
        let comment = alice
            .handle(InboundMessage::AddComment("hello".to_string()))
            .await;
        let title = alice
            .handle(InboundMessage::ChangeTitle("title".to_string()))
            .await;

        // then (期待する結果):
        assert!(comment.is_ok());
        assert!(title.is_ok());
        assert_silent(&mut rx).await;
        assert!(app.get_rooms_usecase.execute().await.is_empty());
    }

    #[tokio::test]
    async fn test_only_host_changes_title() {
        // テスト項目: ホスト以外の CHANGE_TITLE は無視され、ホストの変更は全員に届く
        // given (前提条件):
        let app = app();
        let (mut alice, mut alice_rx) = session(&app, Identity::new("alice"));
        let (mut bob, mut bob_rx) = session(&app, Identity::new("bob"));
        alice
            .handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();
        bob.handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();
        next(&mut alice_rx).await;
        next(&mut alice_rx).await;
        next(&mut bob_rx).await;

        // when (操作):
        bob.handle(InboundMessage::ChangeTitle("hijack".to_string()))
            .await
            .unwrap();
        alice
            .handle(InboundMessage::ChangeTitle("Alice's room".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        let expected = OutboundMessage::TitleChanged("Alice's room".to_string());
        assert_eq!(next(&mut alice_rx).await, expected);
        assert_eq!(next(&mut bob_rx).await, expected);
    }

    #[tokio::test]
    async fn test_rejoin_flushes_old_room_before_new_room_data() {
        // テスト項目: 別ルームへ JOIN すると旧ルームのイベントが新しい ROOM_DATA より前に届き、旧ルームには USER_LEFT が届く
        // given (前提条件):
        let app = app();
        let (mut alice, mut alice_rx) = session(&app, Identity::new("alice"));
        let (mut bob, mut bob_rx) = session(&app, Identity::new("bob"));
        alice
            .handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();
        bob.handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();
        alice
            .handle(InboundMessage::AddComment("first".to_string()))
            .await
            .unwrap();

        // when (操作):
        bob.handle(InboundMessage::Join("bob".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(matches!(
            next(&mut bob_rx).await,
            OutboundMessage::RoomData(_)
        ));
        assert!(matches!(
            next(&mut bob_rx).await,
            OutboundMessage::CommentAdded(_)
        ));
        assert_eq!(next(&mut bob_rx).await, empty_room_data());
        assert_eq!(bob.current_room().map(RoomId::as_str), Some("bob"));

        next(&mut alice_rx).await;
        next(&mut alice_rx).await;
        next(&mut alice_rx).await;
        assert_eq!(
            next(&mut alice_rx).await,
            OutboundMessage::UserLeft("bob".to_string())
        );
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        // テスト項目: close を複数回呼んでも問題なく、メンバーから外れる
        // given (前提条件):
        let app = app();
        let (mut alice, mut rx) = session(&app, Identity::new("alice"));
        alice
            .handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();
        next(&mut rx).await;

        // when (操作):
        alice.close().await;
        alice.close().await;

        // then (期待する結果):
        assert!(matches!(alice.state(), SessionState::Idle));
        let rooms = app.get_rooms_usecase.execute().await;
        assert_eq!(rooms.len(), 1);
        assert!(rooms[0].members.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_message_is_ignored() {
        // テスト項目: 未知のメッセージ種別は無視され、セッションは継続する
        // given (前提条件):
        let app = app();
        let (mut alice, mut rx) = session(&app, Identity::new("alice"));

        // when (操作):
        let result = alice
            .handle(InboundMessage::Unknown("PING".to_string()))
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_silent(&mut rx).await;
    }

    #[tokio::test]
    async fn test_stalled_writer_makes_broadcasts_wait() {
        // テスト項目: 送信キューが読まれないと配信が溜まらず、ADD_COMMENT が待たされる。書き込み側が消えると解放される
        // given (前提条件):
        let config = ServerConfig {
            queue_capacity: 1,
            ..ServerConfig::default()
        };
        let app = Arc::new(AppState::in_memory(&config, Arc::new(FixedClock::new(0))));
        let (mut alice, rx) = session(&app, Identity::new("alice"));
        alice
            .handle(InboundMessage::Join("alice".to_string()))
            .await
            .unwrap();

        // when (操作):
        let mut blocked_at = None;
        for i in 0..5 {
            let comment = alice.handle(InboundMessage::AddComment(format!("c{}", i)));
            if timeout(Duration::from_millis(200), comment).await.is_err() {
                blocked_at = Some(i);
                break;
            }
        }

        // then (期待する結果):
        assert!(blocked_at.is_some(), "ADD_COMMENT never waited for queue space");
        assert_eq!(rx.len(), 1);

        drop(rx);
        timeout(Duration::from_secs(1), alice.close())
            .await
            .expect("close stalled after the writer went away");
        assert!(matches!(alice.state(), SessionState::Idle));
    }
}
