//! Structured logging setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global subscriber: human-readable lines on stderr, filtered
/// by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; returns `false` when a subscriber was
/// already installed.
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("Global tracing subscriber already initialized, keeping it");
    }
    installed
}
