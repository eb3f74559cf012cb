//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Room broadcast server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::default();
/// let state = AppState::in_memory(&config, Arc::new(SystemClock));
/// Server::new(config, state).run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to the configured address and serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!("Roomcast server listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/ws", local_addr);
        tracing::info!(
            "Queue capacity per subscription: {}, identity header: {}",
            self.config.queue_capacity,
            self.config.identity_header
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomcast_shared::time::FixedClock;

    async fn spawn_server() -> String {
        let config = ServerConfig::default();
        let state = AppState::in_memory(&config, Arc::new(FixedClock::new(0)));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(Server::new(config, state).serve(listener));
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_check() {
        // テスト項目: /api/health が {"status":"ok"} を返す
        // given (前提条件):
        let base = spawn_server().await;

        // when (操作):
        let response = reqwest::get(format!("{}/api/health", base)).await.unwrap();

        // then (期待する結果):
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_unknown_room_detail_is_not_found() {
        // テスト項目: 存在しないルームの詳細は 404 になる
        // given (前提条件):
        let base = spawn_server().await;

        // when (操作):
        let response = reqwest::get(format!("{}/api/rooms/ghost", base))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_room_list() {
        // テスト項目: 起動直後のルーム一覧は空
        // given (前提条件):
        let base = spawn_server().await;

        // when (操作):
        let response = reqwest::get(format!("{}/api/rooms", base)).await.unwrap();

        // then (期待する結果):
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!([]));
    }
}
