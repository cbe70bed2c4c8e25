//! Logging to the terminal

use tracing_subscriber::EnvFilter;

/// Log at `info` and above unless `RUST_LOG` says otherwise
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
