//! Diagnostic logging setup

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive (e.g. `debug`)
pub const LOG_ENV: &str = "METALCLOUD_LOG";

/// Pick the filter directive: explicit env var first, then the verbosity flag
pub fn filter_directive(env_value: Option<String>, verbose: bool) -> String {
    match env_value {
        Some(value) if !value.trim().is_empty() => value,
        _ if verbose => "debug".to_string(),
        _ => "warn".to_string(),
    }
}

/// Install the stderr log subscriber. Calling it twice is harmless.
pub fn init_logging(verbose: bool) {
    let directive = filter_directive(std::env::var(LOG_ENV).ok(), verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
