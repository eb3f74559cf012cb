//! Roomcast server.
//!
//! Clients join a room over WebSocket, receive its current state and then
//! every change in the order the room applied it.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server
//! cargo run --bin roomcast-server -- --host 0.0.0.0 --port 3000 --queue-capacity 128
//! ```

use std::sync::Arc;

use axum::http::HeaderName;
use clap::Parser;
use roomcast_server::{
    config::{DEFAULT_IDENTITY_HEADER, ServerConfig},
    infrastructure::broadcast::DEFAULT_QUEUE_CAPACITY,
    ui::{AppState, Server},
};
use roomcast_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "roomcast-server")]
#[command(about = "Room presence and broadcast hub over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Number of undelivered events a subscription may hold before senders wait
    #[arg(short = 'q', long, default_value_t = DEFAULT_QUEUE_CAPACITY, value_parser = parse_queue_capacity)]
    queue_capacity: usize,

    /// Request header set by the authenticating proxy with the user identity
    #[arg(long, default_value = DEFAULT_IDENTITY_HEADER)]
    identity_header: HeaderName,

    /// Default log level when RUST_LOG is not set
    #[arg(short = 'l', long, default_value = "debug")]
    log_level: String,
}

fn parse_queue_capacity(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("queue capacity must be at least 1".to_string()),
        Ok(capacity) => Ok(capacity),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        queue_capacity: args.queue_capacity,
        identity_header: args.identity_header,
    };

    // Repository, BroadcastHub and UseCases are wired by AppState
    let state = AppState::in_memory(&config, Arc::new(SystemClock));

    let server = Server::new(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
