//! Logging initialization and configuration.

use crate::config::LogFormat;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set. JSON output includes the
/// current span, so every request log line carries its `request_id`.
pub fn init_logging(level: &str, format: &LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(false))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    }
}

/// Filter for `level`, with hyper's connection chatter capped at `warn`.
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{},hyper=warn", level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_directives() {
        let filter = default_filter("debug").to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("hyper=warn"));
    }
}
