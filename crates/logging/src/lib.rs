//! Process-wide subscriber setup.
//!
//! Library crates log through the `log` facade and stay silent on their own;
//! whatever binary embeds the workbench (an API server, a CLI) calls
//! [`init_logger`] once at startup to install the subscriber.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber. `RUST_LOG` overrides the filter,
/// `info` is the fallback. Call once, early in main.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_thread_names(true)
                .with_line_number(false)
                .with_file(false),
        )
        .with(filter)
        .init();
}
