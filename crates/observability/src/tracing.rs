//! Tracing/logging initialization.

use std::env;

use tracing_subscriber::EnvFilter;

/// Output settings for the process-wide subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Emit one JSON object per line (default) or compact human-readable lines.
    pub json: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            json: true,
            default_filter: "info".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Defaults overridden by `FORGECAT_LOG_JSON` (`0`/`false` disables JSON).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = env::var("FORGECAT_LOG_JSON") {
            config.json = !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no");
        }
        config
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
