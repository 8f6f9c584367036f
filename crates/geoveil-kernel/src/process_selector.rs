//! [`ProcessSelector`] – the process lookup surface with disabled processes
//! removed.
//!
//! Every lookup consults [`CapabilityGate::is_allowed`]; providers whose
//! processes are all disabled are not offered at all.

use std::sync::Arc;

use geoveil_types::{ProcessProvider, ProcessRegistry};

use crate::capability_gate::CapabilityGate;

/// A [`ProcessRegistry`] decorator backed by a [`CapabilityGate`].
pub struct ProcessSelector {
    registry: Arc<dyn ProcessRegistry>,
    gate: Arc<CapabilityGate>,
}

impl ProcessSelector {
    pub fn new(registry: Arc<dyn ProcessRegistry>, gate: Arc<CapabilityGate>) -> Self {
        Self { registry, gate }
    }

    /// Every allowed process name across all providers, in provider order.
    pub fn process_names(&self) -> Vec<String> {
        self.providers()
            .iter()
            .flat_map(|provider| provider.names())
            .collect()
    }

    /// The provider offering `name`, when the process is allowed.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn ProcessProvider>> {
        if !self.gate.is_allowed(name) {
            return None;
        }
        self.providers()
            .into_iter()
            .find(|provider| provider.names().iter().any(|n| n == name))
    }
}

impl ProcessRegistry for ProcessSelector {
    fn resolve(&self, key: &str) -> Option<Arc<dyn ProcessProvider>> {
        self.registry
            .resolve(key)
            .and_then(|provider| self.select(provider))
    }

    fn providers(&self) -> Vec<Arc<dyn ProcessProvider>> {
        self.registry
            .providers()
            .into_iter()
            .filter_map(|provider| self.select(provider))
            .collect()
    }
}

impl ProcessSelector {
    fn select(&self, provider: Arc<dyn ProcessProvider>) -> Option<Arc<dyn ProcessProvider>> {
        // A provider with no processes has nothing to disable.
        let names = provider.names();
        let allowed = names.is_empty() || names.iter().any(|name| self.gate.is_allowed(name));
        if !allowed {
            return None;
        }
        let selected: Arc<dyn ProcessProvider> = Arc::new(SelectedProvider {
            inner: provider,
            gate: Arc::clone(&self.gate),
        });
        Some(selected)
    }
}

/// Provider view listing only allowed names.
struct SelectedProvider {
    inner: Arc<dyn ProcessProvider>,
    gate: Arc<CapabilityGate>,
}

impl ProcessProvider for SelectedProvider {
    fn key(&self) -> &str {
        self.inner.key()
    }

    fn names(&self) -> Vec<String> {
        self.inner
            .names()
            .into_iter()
            .filter(|name| self.gate.is_allowed(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoveil_memory::StaticProcessRegistry;
    use geoveil_types::{ProcessGroupInfo, ProcessingServiceConfig};

    fn selector(groups: Vec<ProcessGroupInfo>) -> ProcessSelector {
        let registry: Arc<dyn ProcessRegistry> = Arc::new(
            StaticProcessRegistry::new()
                .with_provider("geo", ["geo:buffer", "geo:area"])
                .with_provider("ras", ["ras:Contour"])
                .with_provider("empty", Vec::<String>::new()),
        );
        let gate = Arc::new(CapabilityGate::new(Arc::clone(&registry)));
        gate.recompute(&ProcessingServiceConfig { process_groups: groups });
        ProcessSelector::new(registry, gate)
    }

    #[test]
    fn everything_offered_without_configuration() {
        let s = selector(Vec::new());
        assert_eq!(s.process_names(), ["geo:buffer", "geo:area", "ras:Contour"]);
    }

    #[test]
    fn provider_without_processes_is_still_offered() {
        let s = selector(vec![ProcessGroupInfo::disabled("ras")]);
        let empty = s.resolve("empty").expect("empty provider offered");
        assert!(empty.names().is_empty());
        assert_eq!(s.providers().len(), 2);
    }

    #[test]
    fn disabled_group_removes_its_provider() {
        let s = selector(vec![ProcessGroupInfo::disabled("ras")]);
        assert!(s.resolve("ras").is_none());
        assert_eq!(s.providers().len(), 2);
        assert!(s.lookup("ras:Contour").is_none());
    }

    #[test]
    fn filtered_process_is_not_listed() {
        let s = selector(vec![ProcessGroupInfo::enabled("geo").with_filtered(["geo:area"])]);
        let geo = s.resolve("geo").expect("geo still offered");
        assert_eq!(geo.names(), ["geo:buffer"]);
        assert!(s.lookup("geo:area").is_none());
        assert_eq!(s.lookup("geo:buffer").map(|p| p.key().to_string()), Some("geo".into()));
    }

    #[test]
    fn unknown_name_is_not_found() {
        let s = selector(Vec::new());
        assert!(s.lookup("geo:nope").is_none());
    }
}
