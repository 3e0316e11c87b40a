// src/infra/logger.rs — Structured logging with tracing
//
// Diagnostics only. Operator-facing session lines go through the progress
// sink, so stderr stays readable at the default `warn` level.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("BULKOPS_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
