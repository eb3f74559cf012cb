//! Server configuration.

use axum::http::HeaderName;

use crate::infrastructure::broadcast::DEFAULT_QUEUE_CAPACITY;

/// Header the upstream authentication layer fills with the caller's identity.
pub const DEFAULT_IDENTITY_HEADER: &str = "x-roomcast-user";

/// Runtime settings of the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "127.0.0.1")
    pub host: String,
    /// Port number to bind to (e.g., 8080)
    pub port: u16,
    /// Bound of each subscription queue
    pub queue_capacity: usize,
    /// Request header carrying the caller identity
    pub identity_header: HeaderName,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            identity_header: HeaderName::from_static(DEFAULT_IDENTITY_HEADER),
        }
    }
}
