//! [`CapabilityGate`] – keeps the set of disabled processes in step with the
//! processing service configuration.
//!
//! The disabled set is the union of
//!
//! 1. every process exposed by the provider of a **disabled** process group,
//! 2. the individually filtered processes of every **enabled** group.
//!
//! It is rebuilt from scratch for each configuration snapshot and published
//! with a single pointer swap, so [`CapabilityGate::is_allowed`] never sees a
//! half-built set and never waits for a rebuild.
//!
//! # Lifecycle
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use std::sync::Arc;
//! use geoveil_kernel::CapabilityGate;
//! use geoveil_memory::StaticProcessRegistry;
//! use geoveil_middleware::ConfigStore;
//! use geoveil_types::{ProcessGroupInfo, ProcessingServiceConfig};
//!
//! let registry = StaticProcessRegistry::new().with_provider("ras", ["ras:Contour"]);
//! let store = Arc::new(ConfigStore::default().with_processing(ProcessingServiceConfig {
//!     process_groups: vec![ProcessGroupInfo::disabled("ras")],
//! }));
//!
//! let gate = Arc::new(CapabilityGate::new(Arc::new(registry)));
//! let subscription = gate.initialize(store);
//! assert!(!gate.is_allowed("ras:Contour"));
//!
//! subscription.shutdown();
//! # }
//! ```

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use geoveil_middleware::ServiceConfigSource;
use geoveil_types::{ProcessRegistry, ProcessingServiceConfig, ServiceChange};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Membership test for disabled process names.
pub struct CapabilityGate {
    registry: Arc<dyn ProcessRegistry>,
    disabled: RwLock<Arc<HashSet<String>>>,
}

impl CapabilityGate {
    /// A gate with nothing disabled, resolving providers in `registry`.
    pub fn new(registry: Arc<dyn ProcessRegistry>) -> Self {
        Self {
            registry,
            disabled: RwLock::new(Arc::new(HashSet::new())),
        }
    }

    /// `true` unless `name` is currently disabled.
    pub fn is_allowed(&self, name: &str) -> bool {
        !self.disabled().contains(name)
    }

    /// The currently published disabled set.
    pub fn disabled(&self) -> Arc<HashSet<String>> {
        Arc::clone(&self.disabled.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Read the current snapshot from `source`, if any, and recompute.
    ///
    /// Without a snapshot the disabled set is left as it is.
    pub fn load(&self, source: &dyn ServiceConfigSource) {
        match source.processing_config() {
            Some(config) => self.recompute(&config),
            None => debug!("no processing configuration yet; nothing disabled"),
        }
    }

    /// React to a post-change notification. Changes to other services are
    /// ignored.
    pub fn on_configuration_changed(&self, change: &ServiceChange) {
        match change {
            ServiceChange::Processing(config) => self.recompute(config),
            ServiceChange::Other { service } => {
                debug!(service = %service, "ignoring configuration change");
            }
        }
    }

    /// Rebuild the disabled set from `config` and publish it.
    pub fn recompute(&self, config: &ProcessingServiceConfig) {
        let mut disabled = HashSet::new();
        for group in &config.process_groups {
            if !group.enabled {
                match self.registry.resolve(&group.factory) {
                    Some(provider) => disabled.extend(provider.names()),
                    None => warn!(
                        factory = %group.factory,
                        "disabled process group refers to an unknown provider"
                    ),
                }
            } else {
                disabled.extend(group.filtered_processes.iter().cloned());
            }
        }

        info!(disabled = disabled.len(), "publishing disabled process set");
        *self.disabled.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(disabled);
    }

    /// Load the current snapshot and keep following `source` for changes.
    ///
    /// The listener runs on the current Tokio runtime until the returned
    /// [`GateSubscription`] is shut down or dropped.
    ///
    /// # Panics
    ///
    /// When called outside a Tokio runtime.
    pub fn initialize(self: &Arc<Self>, source: Arc<dyn ServiceConfigSource>) -> GateSubscription {
        // Subscribe before reading so no change slips in between.
        let mut receiver = source.subscribe();
        self.load(source.as_ref());

        let gate = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => gate.on_configuration_changed(&event.change),
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "configuration listener lagged; reloading snapshot");
                        gate.load(source.as_ref());
                    }
                    Err(RecvError::Closed) => {
                        warn!("configuration bus closed; listener stopping");
                        break;
                    }
                }
            }
        });

        GateSubscription {
            handle: Some(handle),
        }
    }
}

/// Keeps a [`CapabilityGate`] subscribed to configuration changes.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct GateSubscription {
    handle: Option<JoinHandle<()>>,
}

impl GateSubscription {
    /// Stop following configuration changes. The disabled set keeps its last
    /// published value.
    pub fn shutdown(mut self) {
        self.stop();
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("configuration listener stopped");
        }
    }
}

impl Drop for GateSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use geoveil_memory::StaticProcessRegistry;
    use geoveil_middleware::ConfigStore;
    use geoveil_types::ProcessGroupInfo;

    fn registry() -> Arc<StaticProcessRegistry> {
        Arc::new(
            StaticProcessRegistry::new()
                .with_provider("g1", ["a", "b"])
                .with_provider("g2", ["c", "d"]),
        )
    }

    fn names(gate: &CapabilityGate) -> Vec<String> {
        let mut v: Vec<String> = gate.disabled().iter().cloned().collect();
        v.sort();
        v
    }

    async fn eventually(gate: &CapabilityGate, expected: &[&str]) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            if names(gate) == expected {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "disabled set stuck at {:?}, expected {expected:?}",
                names(gate)
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[test]
    fn nothing_disabled_initially() {
        let gate = CapabilityGate::new(registry());
        assert!(gate.is_allowed("a"));
        assert!(gate.disabled().is_empty());
    }

    #[test]
    fn recompute_unions_disabled_groups_and_filtered_names() {
        let gate = CapabilityGate::new(registry());
        gate.recompute(&ProcessingServiceConfig {
            process_groups: vec![
                ProcessGroupInfo::disabled("g1"),
                ProcessGroupInfo::enabled("g2").with_filtered(["c"]),
            ],
        });
        assert_eq!(names(&gate), ["a", "b", "c"]);
        assert!(!gate.is_allowed("a"));
        assert!(gate.is_allowed("d"));
    }

    #[test]
    fn recompute_leaves_no_stale_entries() {
        let gate = CapabilityGate::new(registry());
        gate.recompute(&ProcessingServiceConfig {
            process_groups: vec![
                ProcessGroupInfo::disabled("g1"),
                ProcessGroupInfo::enabled("g2").with_filtered(["c"]),
            ],
        });
        gate.recompute(&ProcessingServiceConfig {
            process_groups: vec![
                ProcessGroupInfo::enabled("g1"),
                ProcessGroupInfo::enabled("g2").with_filtered(["c"]),
            ],
        });
        assert_eq!(names(&gate), ["c"]);
    }

    #[test]
    fn filtered_names_of_disabled_group_do_not_matter() {
        let gate = CapabilityGate::new(registry());
        gate.recompute(&ProcessingServiceConfig {
            process_groups: vec![ProcessGroupInfo::disabled("g2").with_filtered(["zzz"])],
        });
        assert_eq!(names(&gate), ["c", "d"]);
    }

    #[test]
    fn unknown_provider_contributes_nothing() {
        let gate = CapabilityGate::new(registry());
        gate.recompute(&ProcessingServiceConfig {
            process_groups: vec![
                ProcessGroupInfo::disabled("missing"),
                ProcessGroupInfo::disabled("g2"),
            ],
        });
        assert_eq!(names(&gate), ["c", "d"]);
    }

    #[test]
    fn other_service_changes_are_ignored() {
        let gate = CapabilityGate::new(registry());
        gate.recompute(&ProcessingServiceConfig {
            process_groups: vec![ProcessGroupInfo::disabled("g1")],
        });
        gate.on_configuration_changed(&ServiceChange::Other { service: "WMS".into() });
        assert_eq!(names(&gate), ["a", "b"]);
    }

    #[test]
    fn load_without_snapshot_keeps_empty_set() {
        let gate = CapabilityGate::new(registry());
        gate.load(&ConfigStore::default());
        assert!(gate.disabled().is_empty());
    }

    #[test]
    fn readers_keep_their_snapshot_across_swaps() {
        let gate = CapabilityGate::new(registry());
        gate.recompute(&ProcessingServiceConfig {
            process_groups: vec![ProcessGroupInfo::disabled("g1")],
        });
        let before = gate.disabled();
        gate.recompute(&ProcessingServiceConfig::default());
        assert_eq!(before.len(), 2);
        assert!(gate.disabled().is_empty());
    }

    #[tokio::test]
    async fn initialize_reads_snapshot_and_follows_changes() {
        let store = Arc::new(ConfigStore::default().with_processing(ProcessingServiceConfig {
            process_groups: vec![
                ProcessGroupInfo::disabled("g1"),
                ProcessGroupInfo::enabled("g2").with_filtered(["c"]),
            ],
        }));
        let gate = Arc::new(CapabilityGate::new(registry()));
        let subscription = gate.initialize(store.clone());
        assert_eq!(names(&gate), ["a", "b", "c"]);
        assert!(subscription.is_active());

        store.save_processing(ProcessingServiceConfig {
            process_groups: vec![ProcessGroupInfo::enabled("g1"), ProcessGroupInfo::disabled("g2")],
        });
        eventually(&gate, &["c", "d"]).await;

        subscription.shutdown();
    }

    #[tokio::test]
    async fn initialize_without_snapshot_waits_for_first_save() {
        let store = Arc::new(ConfigStore::default());
        let gate = Arc::new(CapabilityGate::new(registry()));
        let _subscription = gate.initialize(store.clone());
        assert!(gate.disabled().is_empty());

        store.save_processing(ProcessingServiceConfig {
            process_groups: vec![ProcessGroupInfo::disabled("g1")],
        });
        eventually(&gate, &["a", "b"]).await;
    }

    #[tokio::test]
    async fn shutdown_unsubscribes() {
        let store = Arc::new(ConfigStore::default());
        let gate = Arc::new(CapabilityGate::new(registry()));
        let subscription = gate.initialize(store.clone());
        subscription.shutdown();

        // The aborted task releases its receiver once the runtime drops it.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while store.bus().listener_count() > 0 {
            assert!(tokio::time::Instant::now() < deadline, "listener still subscribed");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        store.save_processing(ProcessingServiceConfig {
            process_groups: vec![ProcessGroupInfo::disabled("g1")],
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(gate.disabled().is_empty());
    }

    #[test]
    fn concurrent_readers_never_see_partial_sets() {
        let gate = Arc::new(CapabilityGate::new(registry()));
        let full = ProcessingServiceConfig {
            process_groups: vec![
                ProcessGroupInfo::disabled("g1"),
                ProcessGroupInfo::disabled("g2"),
            ],
        };
        gate.recompute(&full);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        let size = gate.disabled().len();
                        assert!(size == 4 || size == 0, "observed partial set of {size}");
                    }
                })
            })
            .collect();

        for i in 0..200 {
            if i % 2 == 0 {
                gate.recompute(&ProcessingServiceConfig::default());
            } else {
                gate.recompute(&full);
            }
        }
        for r in readers {
            r.join().expect("reader thread panicked");
        }
    }
}
