//! Tracing subscriber setup for the `otpscan` binary.
//!
//! The library only emits events; installing a subscriber is left to the
//! application. `RUST_LOG` always wins over the defaults chosen here.

use std::sync::Once;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "otpscan=debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs a human-readable subscriber writing to stderr.
///
/// Subsequent calls are ignored.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose);

        tracing_subscriber::registry()
            .with(env_filter(verbose))
            .with(fmt_layer)
            .init();
    });
}

/// Installs a JSON subscriber writing to stderr.
pub fn init_tracing_json(verbose: bool) {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true);

        tracing_subscriber::registry()
            .with(env_filter(verbose))
            .with(fmt_layer)
            .init();
    });
}
