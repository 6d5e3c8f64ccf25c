//! Logging setup for unison binaries
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either
//! human-readable or JSON line output. Library crates only emit `tracing`
//! events; installing a subscriber is left to the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use unison_config::{LogFormat, TelemetryConfig};

/// Resolve the effective filter directive
///
/// Precedence: explicit override (command line), then `RUST_LOG`, then the
/// configured filter. An invalid directive falls back to `info`.
pub fn build_filter(config: &TelemetryConfig, override_filter: Option<&str>) -> EnvFilter {
    let directive = override_filter
        .map(str::to_owned)
        .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok())
        .unwrap_or_else(|| config.filter.clone());

    EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter `{directive}` ({e}), falling back to `info`");
        EnvFilter::new("info")
    })
}

/// Initialize logging from configuration
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig, override_filter: Option<&str>) -> anyhow::Result<()> {
    let filter = build_filter(config, override_filter);

    let result = match config.format {
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(false);

            tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
        }
    };

    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
