//! [`MemoryCatalog`] – an in-process catalog store.
//!
//! Entries are kept in insertion order, which is the order every listing and
//! query returns them in. The catalog is built up front (directly or from a
//! [fixture][crate::fixture]) and read concurrently afterwards.
//!
//! # Example
//!
//! ```rust
//! use geoveil_memory::MemoryCatalog;
//! use geoveil_types::{CatalogReader, NamespaceInfo, ResourceInfo};
//!
//! let mut catalog = MemoryCatalog::new();
//! let topp = catalog.add_namespace(NamespaceInfo {
//!     id: "ns-topp".into(),
//!     prefix: "topp".into(),
//!     uri: "http://www.openplans.org/topp".into(),
//! });
//! catalog.add_resource(ResourceInfo {
//!     id: "ft-states".into(),
//!     name: "states".into(),
//!     namespace: (*topp).clone(),
//!     store: None,
//!     title: None,
//!     enabled: true,
//!     advertised: true,
//! });
//!
//! assert!(catalog.resource_by_name("topp", "states").is_some());
//! ```

use std::sync::Arc;

use geoveil_types::{
    CatalogError, CatalogInfo, CatalogReader, Filter, InfoKind, LayerGroup, LayerGroupInfo,
    LayerInfo, NamespaceInfo, ResourceInfo, StoreInfo, StyleInfo, WorkspaceInfo,
};

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    workspaces: Vec<Arc<WorkspaceInfo>>,
    namespaces: Vec<Arc<NamespaceInfo>>,
    stores: Vec<Arc<StoreInfo>>,
    styles: Vec<Arc<StyleInfo>>,
    resources: Vec<Arc<ResourceInfo>>,
    layers: Vec<Arc<LayerInfo>>,
    groups: Vec<Arc<dyn LayerGroup>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_workspace(&mut self, workspace: WorkspaceInfo) -> Arc<WorkspaceInfo> {
        let workspace = Arc::new(workspace);
        self.workspaces.push(Arc::clone(&workspace));
        workspace
    }

    pub fn add_namespace(&mut self, namespace: NamespaceInfo) -> Arc<NamespaceInfo> {
        let namespace = Arc::new(namespace);
        self.namespaces.push(Arc::clone(&namespace));
        namespace
    }

    pub fn add_store(&mut self, store: StoreInfo) -> Arc<StoreInfo> {
        let store = Arc::new(store);
        self.stores.push(Arc::clone(&store));
        store
    }

    pub fn add_style(&mut self, style: StyleInfo) -> Arc<StyleInfo> {
        let style = Arc::new(style);
        self.styles.push(Arc::clone(&style));
        style
    }

    pub fn add_resource(&mut self, resource: ResourceInfo) -> Arc<ResourceInfo> {
        let resource = Arc::new(resource);
        self.resources.push(Arc::clone(&resource));
        resource
    }

    pub fn add_layer(&mut self, layer: LayerInfo) -> Arc<LayerInfo> {
        let layer = Arc::new(layer);
        self.layers.push(Arc::clone(&layer));
        layer
    }

    pub fn add_layer_group(&mut self, group: LayerGroupInfo) -> Arc<dyn LayerGroup> {
        let group: Arc<dyn LayerGroup> = Arc::new(group);
        self.groups.push(Arc::clone(&group));
        group
    }

    /// Every entry of `kind`, in insertion order.
    fn entries(&self, kind: InfoKind) -> Vec<CatalogInfo> {
        match kind {
            InfoKind::Workspace => wrap(&self.workspaces, CatalogInfo::Workspace),
            InfoKind::Namespace => wrap(&self.namespaces, CatalogInfo::Namespace),
            InfoKind::Store => wrap(&self.stores, CatalogInfo::Store),
            InfoKind::Style => wrap(&self.styles, CatalogInfo::Style),
            InfoKind::Resource => wrap(&self.resources, CatalogInfo::Resource),
            InfoKind::Layer => wrap(&self.layers, CatalogInfo::Layer),
            InfoKind::LayerGroup => wrap(&self.groups, CatalogInfo::LayerGroup),
        }
    }
}

fn wrap<T: ?Sized>(entries: &[Arc<T>], kind: fn(Arc<T>) -> CatalogInfo) -> Vec<CatalogInfo> {
    entries.iter().cloned().map(kind).collect()
}

/// Split `prefix:name`; plain names have no prefix.
fn split_prefixed(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

impl CatalogReader for MemoryCatalog {
    fn resource(&self, id: &str) -> Option<Arc<ResourceInfo>> {
        self.resources.iter().find(|r| r.id == id).cloned()
    }

    fn resource_by_name(&self, prefix: &str, name: &str) -> Option<Arc<ResourceInfo>> {
        self.resources
            .iter()
            .find(|r| r.namespace.prefix == prefix && r.name == name)
            .cloned()
    }

    fn resources(&self) -> Vec<Arc<ResourceInfo>> {
        self.resources.clone()
    }

    fn resources_by_namespace(&self, prefix: &str) -> Vec<Arc<ResourceInfo>> {
        self.resources
            .iter()
            .filter(|r| r.namespace.prefix == prefix)
            .cloned()
            .collect()
    }

    fn layer(&self, id: &str) -> Option<Arc<LayerInfo>> {
        self.layers.iter().find(|l| l.id == id).cloned()
    }

    fn layer_by_name(&self, name: &str) -> Option<Arc<LayerInfo>> {
        let (prefix, local) = split_prefixed(name);
        self.layers
            .iter()
            .find(|l| {
                l.name == local && prefix.is_none_or(|p| l.resource.namespace.prefix == p)
            })
            .cloned()
    }

    fn layers(&self) -> Vec<Arc<LayerInfo>> {
        self.layers.clone()
    }

    fn layers_for_resource(&self, resource_id: &str) -> Vec<Arc<LayerInfo>> {
        self.layers
            .iter()
            .filter(|l| l.resource.id == resource_id)
            .cloned()
            .collect()
    }

    fn layer_group(&self, id: &str) -> Option<Arc<dyn LayerGroup>> {
        self.groups.iter().find(|g| g.id() == id).cloned()
    }

    fn layer_group_by_name(
        &self,
        workspace: Option<&str>,
        name: &str,
    ) -> Option<Arc<dyn LayerGroup>> {
        self.groups
            .iter()
            .find(|g| g.name() == name && g.workspace() == workspace)
            .cloned()
    }

    fn layer_groups(&self) -> Vec<Arc<dyn LayerGroup>> {
        self.groups.clone()
    }

    fn layer_groups_by_workspace(&self, workspace: &str) -> Vec<Arc<dyn LayerGroup>> {
        self.groups
            .iter()
            .filter(|g| g.workspace() == Some(workspace))
            .cloned()
            .collect()
    }

    fn store(&self, id: &str) -> Option<Arc<StoreInfo>> {
        self.stores.iter().find(|s| s.id == id).cloned()
    }

    fn stores(&self) -> Vec<Arc<StoreInfo>> {
        self.stores.clone()
    }

    fn style(&self, id: &str) -> Option<Arc<StyleInfo>> {
        self.styles.iter().find(|s| s.id == id).cloned()
    }

    fn style_by_name(&self, name: &str) -> Option<Arc<StyleInfo>> {
        self.styles.iter().find(|s| s.name == name).cloned()
    }

    fn styles(&self) -> Vec<Arc<StyleInfo>> {
        self.styles.clone()
    }

    fn namespace(&self, prefix: &str) -> Option<Arc<NamespaceInfo>> {
        self.namespaces.iter().find(|n| n.prefix == prefix).cloned()
    }

    fn namespaces(&self) -> Vec<Arc<NamespaceInfo>> {
        self.namespaces.clone()
    }

    fn workspace(&self, name: &str) -> Option<Arc<WorkspaceInfo>> {
        self.workspaces.iter().find(|w| w.name == name).cloned()
    }

    fn workspaces(&self) -> Vec<Arc<WorkspaceInfo>> {
        self.workspaces.clone()
    }

    fn list(&self, kind: InfoKind, filter: &Filter) -> Result<Vec<CatalogInfo>, CatalogError> {
        let mut hits = Vec::new();
        for info in self.entries(kind) {
            if filter.evaluate(&info)? {
                hits.push(info);
            }
        }
        Ok(hits)
    }
}
