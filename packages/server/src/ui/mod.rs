//! UI layer: the axum router, WebSocket sessions and HTTP endpoints.

mod handler;
mod identity;
mod server;
pub mod session;
mod signal;
pub mod state;

pub use identity::resolve_identity;
pub use server::{Server, ServerError};
pub use state::AppState;
