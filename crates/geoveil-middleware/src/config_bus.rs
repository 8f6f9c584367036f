//! Post-change notification stream for service configuration.
//!
//! Uses a [`tokio::sync::broadcast`] channel so every listener receives every
//! [`ConfigEvent`] and a slow listener never blocks the administrative path
//! that publishes changes. A listener that falls behind sees
//! [`RecvError::Lagged`] and is expected to re-read the current snapshot.

use geoveil_types::{CatalogError, ConfigEvent, ServiceChange};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow listeners).
const DEFAULT_CAPACITY: usize = 64;

/// Shared configuration bus. Clones share the same underlying channel.
#[derive(Clone, Debug)]
pub struct ConfigBus {
    sender: broadcast::Sender<ConfigEvent>,
}

impl ConfigBus {
    /// Create a bus buffering at most `capacity` events per listener.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change to every current listener.
    ///
    /// Returns the number of listeners that were handed the event.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Channel`] when nobody is listening.
    pub fn publish(&self, change: ServiceChange) -> Result<usize, CatalogError> {
        let event = ConfigEvent::new(change);
        debug!(event_id = %event.id, "publishing configuration change");
        self.sender
            .send(event)
            .map_err(|_| CatalogError::Channel("no configuration listeners".to_string()))
    }

    /// Register a new listener. Only events published after this call are
    /// delivered to it.
    pub fn subscribe(&self) -> ConfigReceiver {
        ConfigReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ConfigBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A listener handle obtained from [`ConfigBus::subscribe`].
///
/// Dropping the receiver unsubscribes it.
#[derive(Debug)]
pub struct ConfigReceiver {
    receiver: broadcast::Receiver<ConfigEvent>,
}

impl ConfigReceiver {
    /// Wait for the next configuration change.
    ///
    /// Returns:
    /// * `Ok(event)` – a change notification.
    /// * `Err(RecvError::Lagged(n))` – `n` notifications were dropped because
    ///   this listener fell behind.
    /// * `Err(RecvError::Closed)` – every publisher is gone.
    pub async fn recv(&mut self) -> Result<ConfigEvent, RecvError> {
        self.receiver.recv().await
    }
}
