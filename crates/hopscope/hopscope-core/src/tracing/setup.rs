//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding per-module log directives.
pub const LOG_ENV_VAR: &str = "HOPSCOPE_LOG";

/// Initialize the hopscope tracing/logging system.
///
/// Reads `HOPSCOPE_LOG` for per-module log levels, e.g.
/// `HOPSCOPE_LOG=hopscope_core::licensing=debug,hopscope_analysis=info`.
///
/// Falls back to `hopscope=info` if `HOPSCOPE_LOG` is not set or is invalid.
/// Idempotent; later calls are no-ops. If another global subscriber is
/// already installed the call leaves it in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("hopscope=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
