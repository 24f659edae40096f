//! Change events published after catalog configuration writes.
//!
//! The configuration engine itself is pure; these types let the persistence
//! side tell downstream consumers (search indexing, PIM/ERP sync) that an axis
//! set, a pricing record or a bundle composition changed.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
