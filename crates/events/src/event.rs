//! The contract every published change satisfies.

use chrono::{DateTime, Utc};

/// A committed catalog change, described well enough for a subscriber to
/// route and decode it without knowing the producing crate.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted routing name, `<area>.<subject>.<verb>` (`catalog.axes.replaced`).
    fn event_type(&self) -> &'static str;

    /// Payload layout version. Bump when a field changes meaning.
    fn version(&self) -> u32;

    /// Wall-clock time the write was committed.
    fn occurred_at(&self) -> DateTime<Utc>;
}
