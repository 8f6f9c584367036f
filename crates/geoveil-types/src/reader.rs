//! [`CatalogReader`] – the read surface of a catalog provider.
//!
//! The store behind this trait owns every entry; implementors hand out
//! shared [`Arc`] handles. Filtering decorators implement the same trait so
//! callers cannot tell a filtered catalog from the raw one.

use std::sync::Arc;

use crate::CatalogError;
use crate::catalog::{
    CatalogInfo, InfoKind, LayerGroup, LayerInfo, NamespaceInfo, ResourceInfo, StoreInfo,
    StyleInfo, WorkspaceInfo,
};
use crate::query::Filter;

pub trait CatalogReader: Send + Sync {
    fn resource(&self, id: &str) -> Option<Arc<ResourceInfo>>;
    /// Look a resource up by namespace prefix and local name.
    fn resource_by_name(&self, prefix: &str, name: &str) -> Option<Arc<ResourceInfo>>;
    fn resources(&self) -> Vec<Arc<ResourceInfo>>;
    fn resources_by_namespace(&self, prefix: &str) -> Vec<Arc<ResourceInfo>>;

    fn layer(&self, id: &str) -> Option<Arc<LayerInfo>>;
    /// Accepts either a plain layer name or a `prefix:name` qualified name.
    fn layer_by_name(&self, name: &str) -> Option<Arc<LayerInfo>>;
    fn layers(&self) -> Vec<Arc<LayerInfo>>;
    fn layers_for_resource(&self, resource_id: &str) -> Vec<Arc<LayerInfo>>;

    fn layer_group(&self, id: &str) -> Option<Arc<dyn LayerGroup>>;
    /// `workspace` is `None` for global groups.
    fn layer_group_by_name(&self, workspace: Option<&str>, name: &str)
    -> Option<Arc<dyn LayerGroup>>;
    fn layer_groups(&self) -> Vec<Arc<dyn LayerGroup>>;
    fn layer_groups_by_workspace(&self, workspace: &str) -> Vec<Arc<dyn LayerGroup>>;

    fn store(&self, id: &str) -> Option<Arc<StoreInfo>>;
    fn stores(&self) -> Vec<Arc<StoreInfo>>;

    fn style(&self, id: &str) -> Option<Arc<StyleInfo>>;
    fn style_by_name(&self, name: &str) -> Option<Arc<StyleInfo>>;
    fn styles(&self) -> Vec<Arc<StyleInfo>>;

    fn namespace(&self, prefix: &str) -> Option<Arc<NamespaceInfo>>;
    fn namespaces(&self) -> Vec<Arc<NamespaceInfo>>;

    fn workspace(&self, name: &str) -> Option<Arc<WorkspaceInfo>>;
    fn workspaces(&self) -> Vec<Arc<WorkspaceInfo>>;

    /// Every entry of `kind` that matches `filter`, in catalog order.
    ///
    /// # Errors
    ///
    /// Propagates any error raised while evaluating `filter`.
    fn list(&self, kind: InfoKind, filter: &Filter) -> Result<Vec<CatalogInfo>, CatalogError>;

    /// Number of entries of `kind` matching `filter`.
    fn count(&self, kind: InfoKind, filter: &Filter) -> Result<usize, CatalogError> {
        Ok(self.list(kind, filter)?.len())
    }
}
