//! Data Transfer Objects (DTOs) for Roomcast.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame envelope and message DTOs
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
