//! Diagnostic logging
//!
//! Library events go to stderr so they never interleave with the report on
//! stdout. Info-level events from the Kubernetes layer are shown by default;
//! `--debug` adds debug events. `RUST_LOG` takes precedence over both.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "warn,meshstat_kube=info";
const DEBUG_FILTER: &str = "warn,meshstat=debug,meshstat_kube=debug,meshstat_core=debug";

fn default_filter(debug: bool) -> &'static str {
    if debug { DEBUG_FILTER } else { DEFAULT_FILTER }
}

/// Install the global subscriber
pub fn init(debug: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    // A subscriber may already be set when running under a test harness
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_target(debug)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
