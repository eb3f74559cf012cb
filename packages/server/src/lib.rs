//! Roomcast server: room presence and ordered broadcast over WebSocket.
//!
//! Layers, from the inside out:
//!
//! - `domain`: rooms, members, subscriptions and their events
//! - `infrastructure`: in-memory repository, channel broadcast hub, wire DTOs
//! - `usecase`: join, leave, comment, retitle and room queries
//! - `ui`: axum router, per-connection sessions and HTTP endpoints

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
