//! Logging setup for the `ifjcode` binary
//!
//! Interpreter events go to stderr so they never mix with program output.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor a trace level is set
const DEFAULT_FILTER: &str = "warn";

/// Build the filter directive for an interpreter log level
///
/// `level` comes from `--trace` or the `[trace] level` setting and only
/// affects the runtime crate; everything else stays at the default.
fn directive(level: Option<&str>) -> String {
    match level {
        Some(level) => format!("{},ifjcode_runtime={}", DEFAULT_FILTER, level),
        None => DEFAULT_FILTER.to_string(),
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over `level` when set.
pub fn init(level: Option<&str>) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(level)));

    // A subscriber may already be installed (tests); keep the existing one
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
