//! Caller identity taken from the upgrade request.
//!
//! Authentication happens upstream; by the time a request reaches the server
//! the trusted header either names the user or is absent.

use axum::http::{HeaderMap, HeaderName};

use crate::domain::Identity;

/// Resolve the caller identity once per connection.
///
/// A missing, non-UTF-8 or blank header yields the anonymous identity.
pub fn resolve_identity(headers: &HeaderMap, header: &HeaderName) -> Identity {
    headers
        .get(header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(Identity::new)
        .unwrap_or_default()
}
