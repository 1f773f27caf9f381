use tracing_subscriber::{EnvFilter, fmt};

use crate::utils::consts::LOG_LEVEL;

/// Install the process-wide tracing subscriber. Diagnostics go to stderr
/// so run logs piped to stdout stay clean.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_LEVEL));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}
