//! [`AdvertisedCatalog`] – a [`CatalogReader`] decorator that applies
//! [`VisibilityFilter`] to everything it returns.
//!
//! The decorator is bound to a request with [`AdvertisedCatalog::view`]; the
//! resulting [`AdvertisedView`] has exactly the read surface of the wrapped
//! catalog, so callers cannot tell the two apart.
//!
//! # Example
//!
//! ```
//! use geoveil_kernel::AdvertisedCatalog;
//! use geoveil_memory::MemoryCatalog;
//! use geoveil_types::{CatalogReader, Request};
//!
//! let catalog = AdvertisedCatalog::new(MemoryCatalog::new());
//! let request = Request::capabilities();
//! assert!(catalog.view(Some(&request)).layers().is_empty());
//! ```

use std::sync::Arc;

use geoveil_types::{
    CatalogError, CatalogInfo, CatalogReader, Filter, InfoKind, LayerGroup, LayerInfo,
    NamespaceInfo, Request, ResourceInfo, StoreInfo, StyleInfo, WorkspaceInfo,
};

use crate::group_policy::GroupVisibilityPolicy;
use crate::visibility::VisibilityFilter;

/// Owns the wrapped catalog and the visibility rules.
#[derive(Debug)]
pub struct AdvertisedCatalog<C> {
    catalog: C,
    filter: VisibilityFilter,
}

impl<C: CatalogReader> AdvertisedCatalog<C> {
    /// Wrap `catalog` using the default [`VisibilityFilter`].
    pub fn new(catalog: C) -> Self {
        Self::with_filter(catalog, VisibilityFilter::new())
    }

    pub fn with_filter(catalog: C, filter: VisibilityFilter) -> Self {
        Self { catalog, filter }
    }

    pub fn set_group_policy(&mut self, policy: Arc<dyn GroupVisibilityPolicy>) {
        self.filter.set_group_policy(policy);
    }

    pub fn filter(&self) -> &VisibilityFilter {
        &self.filter
    }

    /// The unfiltered catalog.
    pub fn inner(&self) -> &C {
        &self.catalog
    }

    /// Read the catalog as seen by `request`.
    pub fn view<'a>(&'a self, request: Option<&'a Request>) -> AdvertisedView<'a, C> {
        AdvertisedView {
            catalog: &self.catalog,
            filter: &self.filter,
            request,
        }
    }
}

/// The filtered catalog for one request.
#[derive(Debug)]
pub struct AdvertisedView<'a, C> {
    catalog: &'a C,
    filter: &'a VisibilityFilter,
    request: Option<&'a Request>,
}

impl<C: CatalogReader> CatalogReader for AdvertisedView<'_, C> {
    fn resource(&self, id: &str) -> Option<Arc<ResourceInfo>> {
        self.filter.filter_resource(self.catalog.resource(id), self.request)
    }

    fn resource_by_name(&self, prefix: &str, name: &str) -> Option<Arc<ResourceInfo>> {
        self.filter
            .filter_resource(self.catalog.resource_by_name(prefix, name), self.request)
    }

    fn resources(&self) -> Vec<Arc<ResourceInfo>> {
        self.filter.filter_resources(self.catalog.resources(), self.request)
    }

    fn resources_by_namespace(&self, prefix: &str) -> Vec<Arc<ResourceInfo>> {
        self.filter
            .filter_resources(self.catalog.resources_by_namespace(prefix), self.request)
    }

    fn layer(&self, id: &str) -> Option<Arc<LayerInfo>> {
        self.filter.filter_layer(self.catalog.layer(id), self.request)
    }

    fn layer_by_name(&self, name: &str) -> Option<Arc<LayerInfo>> {
        self.filter.filter_layer(self.catalog.layer_by_name(name), self.request)
    }

    fn layers(&self) -> Vec<Arc<LayerInfo>> {
        self.filter.filter_layers(self.catalog.layers(), self.request)
    }

    fn layers_for_resource(&self, resource_id: &str) -> Vec<Arc<LayerInfo>> {
        self.filter
            .filter_layers(self.catalog.layers_for_resource(resource_id), self.request)
    }

    fn layer_group(&self, id: &str) -> Option<Arc<dyn LayerGroup>> {
        self.filter.filter_group(self.catalog.layer_group(id), self.request)
    }

    fn layer_group_by_name(
        &self,
        workspace: Option<&str>,
        name: &str,
    ) -> Option<Arc<dyn LayerGroup>> {
        self.filter
            .filter_group(self.catalog.layer_group_by_name(workspace, name), self.request)
    }

    fn layer_groups(&self) -> Vec<Arc<dyn LayerGroup>> {
        self.filter.filter_groups(self.catalog.layer_groups(), self.request)
    }

    fn layer_groups_by_workspace(&self, workspace: &str) -> Vec<Arc<dyn LayerGroup>> {
        self.filter
            .filter_groups(self.catalog.layer_groups_by_workspace(workspace), self.request)
    }

    // Stores, styles, namespaces and workspaces are not subject to
    // advertised-flag filtering.

    fn store(&self, id: &str) -> Option<Arc<StoreInfo>> {
        self.catalog.store(id)
    }

    fn stores(&self) -> Vec<Arc<StoreInfo>> {
        self.catalog.stores()
    }

    fn style(&self, id: &str) -> Option<Arc<StyleInfo>> {
        self.catalog.style(id)
    }

    fn style_by_name(&self, name: &str) -> Option<Arc<StyleInfo>> {
        self.catalog.style_by_name(name)
    }

    fn styles(&self) -> Vec<Arc<StyleInfo>> {
        self.catalog.styles()
    }

    fn namespace(&self, prefix: &str) -> Option<Arc<NamespaceInfo>> {
        self.catalog.namespace(prefix)
    }

    fn namespaces(&self) -> Vec<Arc<NamespaceInfo>> {
        self.catalog.namespaces()
    }

    fn workspace(&self, name: &str) -> Option<Arc<WorkspaceInfo>> {
        self.catalog.workspace(name)
    }

    fn workspaces(&self) -> Vec<Arc<WorkspaceInfo>> {
        self.catalog.workspaces()
    }

    /// Runs the query with the visibility predicate injected, then passes
    /// each hit through the single-entry filter so groups come back as
    /// filtered views.
    fn list(&self, kind: InfoKind, filter: &Filter) -> Result<Vec<CatalogInfo>, CatalogError> {
        let secured = self
            .filter
            .build_query_predicate(kind, filter.clone(), self.request);
        let hits = self.catalog.list(kind, &secured)?;
        Ok(hits
            .into_iter()
            .filter_map(|info| self.filter.filter_info(info, self.request))
            .collect())
    }
}
