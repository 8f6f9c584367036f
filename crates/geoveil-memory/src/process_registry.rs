//! [`StaticProcessRegistry`] – a fixed set of process providers.

use std::sync::Arc;

use geoveil_types::{ProcessProvider, ProcessRegistry};

/// A provider with a fixed list of process names.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    key: String,
    names: Vec<String>,
}

impl StaticProvider {
    pub fn new<I, S>(key: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ProcessProvider for StaticProvider {
    fn key(&self) -> &str {
        &self.key
    }

    fn names(&self) -> Vec<String> {
        self.names.clone()
    }
}

/// Registry of [`StaticProvider`]s, resolved by key.
///
/// # Example
///
/// ```
/// use geoveil_memory::StaticProcessRegistry;
/// use geoveil_types::ProcessRegistry;
///
/// let registry = StaticProcessRegistry::new()
///     .with_provider("geo", ["geo:buffer", "geo:area"]);
/// assert_eq!(registry.resolve("geo").unwrap().names().len(), 2);
/// assert!(registry.resolve("ras").is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticProcessRegistry {
    providers: Vec<Arc<StaticProvider>>,
}

impl StaticProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StaticProcessRegistry::register`].
    pub fn with_provider<I, S>(mut self, key: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(StaticProvider::new(key, names));
        self
    }

    /// Install `provider`, replacing any provider with the same key.
    pub fn register(&mut self, provider: StaticProvider) {
        self.providers.retain(|p| p.key != provider.key);
        self.providers.push(Arc::new(provider));
    }
}

impl ProcessRegistry for StaticProcessRegistry {
    fn resolve(&self, key: &str) -> Option<Arc<dyn ProcessProvider>> {
        self.providers
            .iter()
            .find(|p| p.key == key)
            .map(|p| Arc::clone(p) as Arc<dyn ProcessProvider>)
    }

    fn providers(&self) -> Vec<Arc<dyn ProcessProvider>> {
        self.providers
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn ProcessProvider>)
            .collect()
    }
}
