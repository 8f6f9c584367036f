//! Process providers and the registry that resolves them by factory key.

use std::sync::Arc;

/// A provider (factory) of named processing operations.
pub trait ProcessProvider: Send + Sync {
    /// Key the administrator uses to refer to this provider in
    /// [`ProcessGroupInfo::factory`][crate::ProcessGroupInfo::factory].
    fn key(&self) -> &str;

    /// Every process name this provider exposes, e.g. `"geo:buffer"`.
    fn names(&self) -> Vec<String>;
}

/// Lookup of process providers.
pub trait ProcessRegistry: Send + Sync {
    /// Resolve a provider by key; `None` when no such provider is installed.
    fn resolve(&self, key: &str) -> Option<Arc<dyn ProcessProvider>>;

    /// All installed providers.
    fn providers(&self) -> Vec<Arc<dyn ProcessProvider>>;
}
