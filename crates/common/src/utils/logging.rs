use std::io;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor config provides one.
pub const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

fn env_filter_or(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Compact stdout logging with `DEFAULT_FILTER`, unless `RUST_LOG` says otherwise.
pub fn init_logging_default() {
    init_logging(LogFormat::Compact, DEFAULT_FILTER);
}

/// Initialize the subscriber in the given format.
///
/// `RUST_LOG` overrides `filter`. Safe to call more than once: later calls are ignored.
pub fn init_logging(format: LogFormat, filter: &str) {
    let env_filter = env_filter_or(filter);
    let _ = match format {
        LogFormat::Compact => fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .with_writer(io::stdout)
            .try_init(),
        LogFormat::Json => fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .with_writer(io::stdout)
            .try_init(),
    };
}
