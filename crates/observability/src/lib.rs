//! Tracing/logging setup shared by every process embedding the engine.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::ObservabilityConfig;

/// Initialize process-wide observability (JSON logs, `RUST_LOG` filter).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&ObservabilityConfig::from_env());
}
