//! [`ConfigStore`] – holds the current service configuration snapshots and
//! announces every save on a [`ConfigBus`].

use std::sync::{PoisonError, RwLock};

use geoveil_types::{ProcessingServiceConfig, ServiceChange};
use tracing::debug;

use crate::config_bus::{ConfigBus, ConfigReceiver};

/// Read side of the configuration subsystem.
pub trait ServiceConfigSource: Send + Sync {
    /// Current processing service snapshot, if one has been saved.
    fn processing_config(&self) -> Option<ProcessingServiceConfig>;

    /// Subscribe to post-change notifications for every service.
    fn subscribe(&self) -> ConfigReceiver;
}

/// In-memory configuration store.
///
/// # Example
///
/// ```
/// use geoveil_middleware::{ConfigStore, ServiceConfigSource};
/// use geoveil_types::{ProcessGroupInfo, ProcessingServiceConfig};
///
/// let store = ConfigStore::default();
/// assert!(store.processing_config().is_none());
///
/// store.save_processing(ProcessingServiceConfig {
///     process_groups: vec![ProcessGroupInfo::disabled("ras")],
/// });
/// assert_eq!(store.processing_config().unwrap().process_groups.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ConfigStore {
    processing: RwLock<Option<ProcessingServiceConfig>>,
    bus: ConfigBus,
}

impl ConfigStore {
    pub fn new(bus: ConfigBus) -> Self {
        Self {
            processing: RwLock::new(None),
            bus,
        }
    }

    /// Seed the store with an initial snapshot without notifying anyone.
    pub fn with_processing(self, config: ProcessingServiceConfig) -> Self {
        *self.processing.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
        self
    }

    pub fn bus(&self) -> &ConfigBus {
        &self.bus
    }

    /// Replace the processing snapshot and notify listeners.
    ///
    /// The write lock is held until the event is published, so concurrent
    /// saves are announced in the order they were stored and the last event
    /// always carries the current snapshot.
    pub fn save_processing(&self, config: ProcessingServiceConfig) {
        let mut guard = self.processing.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(config.clone());
        self.notify(ServiceChange::Processing(config));
        drop(guard);
    }

    /// Announce that the configuration of another service was saved.
    pub fn save_other(&self, service: &str) {
        self.notify(ServiceChange::Other {
            service: service.to_string(),
        });
    }

    fn notify(&self, change: ServiceChange) {
        if let Err(e) = self.bus.publish(change) {
            debug!(error = %e, "configuration saved with nobody listening");
        }
    }
}

impl ServiceConfigSource for ConfigStore {
    fn processing_config(&self) -> Option<ProcessingServiceConfig> {
        self.processing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe(&self) -> ConfigReceiver {
        self.bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoveil_types::ProcessGroupInfo;

    #[tokio::test]
    async fn save_notifies_listeners() -> Result<(), Box<dyn std::error::Error>> {
        let store = ConfigStore::default();
        let mut rx = store.subscribe();

        let config = ProcessingServiceConfig {
            process_groups: vec![ProcessGroupInfo::disabled("ras")],
        };
        store.save_processing(config.clone());

        let event = rx.recv().await?;
        assert_eq!(event.change, ServiceChange::Processing(config.clone()));
        assert_eq!(store.processing_config(), Some(config));
        Ok(())
    }

    #[tokio::test]
    async fn other_services_are_announced_too() -> Result<(), Box<dyn std::error::Error>> {
        let store = ConfigStore::default();
        let mut rx = store.subscribe();
        store.save_other("WMS");
        let event = rx.recv().await?;
        assert_eq!(event.change, ServiceChange::Other { service: "WMS".into() });
        assert!(store.processing_config().is_none());
        Ok(())
    }

    #[test]
    fn seeded_snapshot_is_visible_without_notification() {
        let store = ConfigStore::default().with_processing(ProcessingServiceConfig::default());
        assert_eq!(store.processing_config(), Some(ProcessingServiceConfig::default()));
    }

    #[tokio::test]
    async fn concurrent_saves_announce_the_stored_snapshot_last()
    -> Result<(), Box<dyn std::error::Error>> {
        let store = std::sync::Arc::new(ConfigStore::default());
        let mut rx = store.subscribe();

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..8 {
                        store.save_processing(ProcessingServiceConfig {
                            process_groups: vec![ProcessGroupInfo::disabled(format!("w{t}-{i}"))],
                        });
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().expect("writer thread panicked");
        }

        let mut last = None;
        for _ in 0..32 {
            last = Some(rx.recv().await?.change);
        }
        let stored = store.processing_config().expect("snapshot saved");
        assert_eq!(last, Some(ServiceChange::Processing(stored)));
        Ok(())
    }

    #[test]
    fn save_without_listeners_does_not_fail() {
        let store = ConfigStore::default();
        store.save_processing(ProcessingServiceConfig::default());
        assert!(store.processing_config().is_some());
    }
}
