use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggerConfig};

/// Install the global subscriber. `RUST_LOG`, when set, wins over the
/// configured level.
pub fn init(config: &LoggerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt().with_env_filter(filter).with_target(true);
    match config.format() {
        LogFormat::Json => builder.json().flatten_event(true).init(),
        LogFormat::Text => builder.init(),
    }
}
