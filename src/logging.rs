//! Tracing initialisation for the binary
//!
//! `RUST_LOG` wins when set. Otherwise debug mode logs this crate at
//! `debug` and everything else logs at `info`. Logs go to stderr so the
//! JSON summary on stdout stays machine-readable.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive for the given mode
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "info,alpa_autoupdate=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init_tracing(debug: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(debug)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
}
