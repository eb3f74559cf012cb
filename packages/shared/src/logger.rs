//! Logging setup for Roomcast binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are let through by the default filter.
const ROOMCAST_CRATES: &[&str] = &["roomcast_server", "roomcast_shared", "tower_http"];

/// Build the default filter directive used when `RUST_LOG` is unset.
///
/// Every Roomcast crate and the binary itself log at `default_level`;
/// everything else falls back to `warn`.
pub fn default_directive(binary_name: &str, default_level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        ROOMCAST_CRATES
            .iter()
            .map(|krate| format!("{}={}", krate, default_level)),
    );
    directives.push(format!("{}={}", binary_name.replace('-', "_"), default_level));
    directives.join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level can be overridden with the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use roomcast_shared::logger::setup_logger;
///
/// setup_logger("roomcast-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
