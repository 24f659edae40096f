//! Process-local [`EventBus`] backed by `std::sync::mpsc` channels.
//!
//! Used by the configurator service in tests, benches and single-process
//! deployments. Delivery is synchronous with `publish`.

use std::sync::{Mutex, mpsc};

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InMemoryBusError {
    #[error("subscriber registry lock poisoned")]
    Poisoned,
}

/// Fans every published message out to all live subscriptions.
///
/// A subscription whose receiver was dropped is forgotten on the next publish.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    senders: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions still registered. Dropped ones count until the next publish.
    pub fn subscriber_count(&self) -> usize {
        self.senders.lock().map(|senders| senders.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut senders = self.senders.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        senders.retain(|sender| sender.send(message.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (sender, receiver) = mpsc::channel();
        match self.senders.lock() {
            Ok(mut senders) => senders.push(sender),
            // The subscription stays valid but silent.
            Err(_) => tracing::warn!("event bus registry poisoned; subscription will receive nothing"),
        }
        Subscription::new(receiver)
    }
}
