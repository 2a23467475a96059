//! Diagnostic logging setup.
//!
//! Events go to stderr so stdout stays free for prompt output and MCP
//! traffic. `GIC_LOG` takes an `EnvFilter` directive; without it the level
//! is `warn`, or `debug` with `--verbose`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "GIC_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "gic=debug" } else { "warn" }
}

/// Build the filter from `GIC_LOG`, falling back to the verbosity default.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
