//! [`VisibilityFilter`] – hides non-advertised resources and layers from
//! capabilities documents.
//!
//! An entry whose `advertised` flag is off stays reachable by every request
//! that names it directly (`GetMap`, `GetFeature`, …) but must not be listed
//! by `GetCapabilities`. The single exception is a layer-specific virtual
//! service: a capabilities request whose context is `prefix/name` still lists
//! the resource it is scoped to.
//!
//! Layer groups have no flag of their own. Their members are filtered
//! recursively and the configured [`GroupVisibilityPolicy`] decides whether
//! the group itself survives. When members were dropped, the caller gets a
//! [`FilteredLayerGroup`] view instead of the stored group.
//!
//! The same decision is available as a [`Filter`] through
//! [`VisibilityFilter::build_query_predicate`] so bulk catalog queries apply
//! identical rules.

use std::fmt;
use std::sync::Arc;

use geoveil_types::request::eq_ignore_case;
use geoveil_types::{
    CatalogError, CatalogInfo, Expression, Filter, InfoKind, LayerGroup, LayerInfo,
    PublishedInfo, Request, ResourceInfo, Value, VolatileFunction,
};
use tracing::debug;

use crate::filtered_group::FilteredLayerGroup;
use crate::group_policy::{GroupVisibilityPolicy, HideNever};

/// Visibility decisions for resources, layers and layer groups.
///
/// Cheap to clone; clones share the group policy. Every decision takes the
/// request being served explicitly; `None` means no request is in flight and
/// nothing is hidden.
#[derive(Clone)]
pub struct VisibilityFilter {
    group_policy: Arc<dyn GroupVisibilityPolicy>,
}

impl fmt::Debug for VisibilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityFilter").finish_non_exhaustive()
    }
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            group_policy: Arc::new(HideNever),
        }
    }
}

impl VisibilityFilter {
    /// A filter using [`HideNever`] for layer groups.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group_policy(group_policy: Arc<dyn GroupVisibilityPolicy>) -> Self {
        Self { group_policy }
    }

    pub fn set_group_policy(&mut self, group_policy: Arc<dyn GroupVisibilityPolicy>) {
        self.group_policy = group_policy;
    }

    // ── Single-entry decisions ──────────────────────────────────────────────

    /// `true` when `resource` is not advertised and `request` lists
    /// capabilities outside the resource's own virtual service.
    pub fn is_resource_hidden(&self, resource: &ResourceInfo, request: Option<&Request>) -> bool {
        !resource.advertised && check_capabilities_request(resource, request)
    }

    /// A non-advertised layer is hidden under the same rule as a resource,
    /// scoped by its resource's identity. An advertised layer is hidden
    /// exactly when its resource is.
    pub fn is_layer_hidden(&self, layer: &LayerInfo, request: Option<&Request>) -> bool {
        if !layer.advertised {
            check_capabilities_request(&layer.resource, request)
        } else {
            self.is_resource_hidden(&layer.resource, request)
        }
    }

    // ── Filtering ──────────────────────────────────────────────────────────

    pub fn filter_resource(
        &self,
        resource: Option<Arc<ResourceInfo>>,
        request: Option<&Request>,
    ) -> Option<Arc<ResourceInfo>> {
        let resource = resource?;
        if self.is_resource_hidden(&resource, request) {
            debug!(resource = %resource.prefixed_name(), "hiding non-advertised resource");
            None
        } else {
            Some(resource)
        }
    }

    pub fn filter_layer(
        &self,
        layer: Option<Arc<LayerInfo>>,
        request: Option<&Request>,
    ) -> Option<Arc<LayerInfo>> {
        let layer = layer?;
        if self.is_layer_hidden(&layer, request) {
            debug!(layer = %layer.prefixed_name(), "hiding non-advertised layer");
            None
        } else {
            Some(layer)
        }
    }

    /// Filter the members of `group` recursively.
    ///
    /// Returns `None` when the group policy hides the group. Returns the very
    /// same `Arc` when every member came back untouched, and a
    /// [`FilteredLayerGroup`] over the surviving members otherwise. The
    /// stored group is never modified.
    pub fn filter_group(
        &self,
        group: Option<Arc<dyn LayerGroup>>,
        request: Option<&Request>,
    ) -> Option<Arc<dyn LayerGroup>> {
        let group = group?;

        let filtered: Vec<PublishedInfo> = group
            .layers()
            .iter()
            .filter_map(|member| match member {
                PublishedInfo::Layer(layer) => self
                    .filter_layer(Some(Arc::clone(layer)), request)
                    .map(PublishedInfo::Layer),
                PublishedInfo::Group(nested) => self
                    .filter_group(Some(Arc::clone(nested)), request)
                    .map(PublishedInfo::Group),
            })
            .collect();

        if self.group_policy.hide_group(&*group, &filtered) {
            debug!(group = %group.prefixed_name(), "hiding layer group");
            return None;
        }

        if unchanged(group.layers(), &filtered) {
            Some(group)
        } else {
            debug!(
                group = %group.prefixed_name(),
                kept = filtered.len(),
                total = group.layers().len(),
                "exposing filtered view of layer group"
            );
            let view: Arc<dyn LayerGroup> = Arc::new(FilteredLayerGroup::new(group, filtered));
            Some(view)
        }
    }

    pub fn filter_resources(
        &self,
        resources: Vec<Arc<ResourceInfo>>,
        request: Option<&Request>,
    ) -> Vec<Arc<ResourceInfo>> {
        resources
            .into_iter()
            .filter_map(|r| self.filter_resource(Some(r), request))
            .collect()
    }

    pub fn filter_layers(
        &self,
        layers: Vec<Arc<LayerInfo>>,
        request: Option<&Request>,
    ) -> Vec<Arc<LayerInfo>> {
        layers
            .into_iter()
            .filter_map(|l| self.filter_layer(Some(l), request))
            .collect()
    }

    pub fn filter_groups(
        &self,
        groups: Vec<Arc<dyn LayerGroup>>,
        request: Option<&Request>,
    ) -> Vec<Arc<dyn LayerGroup>> {
        groups
            .into_iter()
            .filter_map(|g| self.filter_group(Some(g), request))
            .collect()
    }

    /// Apply the filter matching the entry's kind. Stores, styles,
    /// namespaces and workspaces always pass.
    pub fn filter_info(&self, info: CatalogInfo, request: Option<&Request>) -> Option<CatalogInfo> {
        match info {
            CatalogInfo::Resource(r) => {
                self.filter_resource(Some(r), request).map(CatalogInfo::Resource)
            }
            CatalogInfo::Layer(l) => self.filter_layer(Some(l), request).map(CatalogInfo::Layer),
            CatalogInfo::LayerGroup(g) => {
                self.filter_group(Some(g), request).map(CatalogInfo::LayerGroup)
            }
            other => Some(other),
        }
    }

    // ── Query integration ──────────────────────────────────────────────────

    /// Whether `info` would survive filtering.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnsupportedFilterTarget`] for entries that are not
    /// resources, layers or layer groups.
    pub fn is_visible(
        &self,
        info: &CatalogInfo,
        request: Option<&Request>,
    ) -> Result<bool, CatalogError> {
        match info {
            CatalogInfo::Resource(r) => Ok(!self.is_resource_hidden(r, request)),
            CatalogInfo::Layer(l) => Ok(!self.is_layer_hidden(l, request)),
            CatalogInfo::LayerGroup(g) => {
                Ok(self.filter_group(Some(Arc::clone(g)), request).is_some())
            }
            other => Err(CatalogError::UnsupportedFilterTarget(other.kind())),
        }
    }

    /// Combine `filter` with a visibility test for entries of `kind`.
    ///
    /// The test is only added for capabilities requests and only for
    /// resources, layers and layer groups; otherwise `filter` is returned
    /// as is. The added test is a [`VolatileFunction`], so the resulting
    /// filter reports itself as not cacheable.
    pub fn build_query_predicate(
        &self,
        kind: InfoKind,
        filter: Filter,
        request: Option<&Request>,
    ) -> Filter {
        let Some(request) = request.filter(|r| r.is_capabilities()) else {
            return filter;
        };
        if !matches!(
            kind,
            InfoKind::Resource | InfoKind::Layer | InfoKind::LayerGroup
        ) {
            return filter;
        }

        let visible = VisibleFunction {
            filter: self.clone(),
            request: request.clone(),
        };
        let visibility = Filter::equals(
            Expression::literal(true),
            Expression::function(Arc::new(visible)),
        );
        Filter::and(filter, visibility)
    }
}

/// Hiding applies only to capabilities requests, and never to the resource
/// a layer-specific virtual service is scoped to.
fn check_capabilities_request(resource: &ResourceInfo, request: Option<&Request>) -> bool {
    match request {
        Some(request) if request.is_capabilities() => !is_scoped_exception(resource, request),
        _ => false,
    }
}

/// `true` when the request context names this resource as `prefix/name`.
fn is_scoped_exception(resource: &ResourceInfo, request: &Request) -> bool {
    request
        .context
        .as_deref()
        .is_some_and(|context| eq_ignore_case(&resource.scope_key(), context))
}

/// Members came back as the very same objects, in the same order.
fn unchanged(original: &[PublishedInfo], filtered: &[PublishedInfo]) -> bool {
    original.len() == filtered.len()
        && original.iter().zip(filtered).all(|pair| match pair {
            (PublishedInfo::Layer(a), PublishedInfo::Layer(b)) => Arc::ptr_eq(a, b),
            (PublishedInfo::Group(a), PublishedInfo::Group(b)) => Arc::ptr_eq(a, b),
            _ => false,
        })
}

/// `visible(info)` as a query function. Bound to one request; evaluated
/// afresh for every entry.
struct VisibleFunction {
    filter: VisibilityFilter,
    request: Request,
}

impl VolatileFunction for VisibleFunction {
    fn name(&self) -> &str {
        "visible"
    }

    fn evaluate(&self, info: &CatalogInfo) -> Result<Value, CatalogError> {
        self.filter
            .is_visible(info, Some(&self.request))
            .map(Value::Bool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group_policy::{HideEmpty, HideIfAllHidden};
    use geoveil_types::{LayerGroupInfo, LayerGroupMode, NamespaceInfo, StoreInfo};

    fn ns(prefix: &str) -> NamespaceInfo {
        NamespaceInfo {
            id: format!("ns-{prefix}"),
            prefix: prefix.into(),
            uri: format!("http://example.com/{prefix}"),
        }
    }

    fn resource(prefix: &str, name: &str, advertised: bool) -> Arc<ResourceInfo> {
        Arc::new(ResourceInfo {
            id: format!("ft-{name}"),
            name: name.into(),
            namespace: ns(prefix),
            store: None,
            title: None,
            enabled: true,
            advertised,
        })
    }

    fn layer(resource: Arc<ResourceInfo>, advertised: bool) -> Arc<LayerInfo> {
        Arc::new(LayerInfo {
            id: format!("l-{}", resource.name),
            name: resource.name.clone(),
            resource,
            default_style: None,
            enabled: true,
            advertised,
        })
    }

    fn group(name: &str, layers: Vec<PublishedInfo>) -> Arc<dyn LayerGroup> {
        Arc::new(LayerGroupInfo {
            id: format!("lg-{name}"),
            name: name.into(),
            title: Some(format!("{name} title")),
            abstract_text: Some("abstract".into()),
            mode: LayerGroupMode::Named,
            workspace: Some("topp".into()),
            layers,
        })
    }

    fn caps() -> Request {
        Request::capabilities()
    }

    fn get_map() -> Request {
        Request::new("GetMap")
    }

    fn member_ids(group: &dyn LayerGroup) -> Vec<String> {
        group.layers().iter().map(|p| p.id().to_string()).collect()
    }

    // ── resources ──────────────────────────────────────────────────────────

    #[test]
    fn unadvertised_resource_visible_outside_capabilities() {
        let f = VisibilityFilter::new();
        let r = resource("topp", "states", false);
        assert!(!f.is_resource_hidden(&r, None));
        assert!(!f.is_resource_hidden(&r, Some(&get_map())));
        assert!(!f.is_resource_hidden(&r, Some(&Request::default())));
    }

    #[test]
    fn unadvertised_resource_hidden_in_capabilities() {
        let f = VisibilityFilter::new();
        let r = resource("topp", "states", false);
        assert!(f.is_resource_hidden(&r, Some(&caps())));
        assert!(f.is_resource_hidden(&r, Some(&Request::new("getcapabilities"))));
    }

    #[test]
    fn advertised_resource_never_hidden() {
        let f = VisibilityFilter::new();
        let r = resource("topp", "states", true);
        assert!(!f.is_resource_hidden(&r, Some(&caps())));
    }

    #[test]
    fn scoped_virtual_service_shows_its_own_resource() {
        let f = VisibilityFilter::new();
        let r = resource("topp", "states", false);
        assert!(!f.is_resource_hidden(&r, Some(&caps().with_context("topp/states"))));
        assert!(!f.is_resource_hidden(&r, Some(&caps().with_context("TOPP/States"))));
        // Other scopes, including the workspace-only one, still hide it.
        assert!(f.is_resource_hidden(&r, Some(&caps().with_context("topp/roads"))));
        assert!(f.is_resource_hidden(&r, Some(&caps().with_context("topp"))));
    }

    // ── layers ─────────────────────────────────────────────────────────────

    #[test]
    fn unadvertised_layer_hidden_regardless_of_resource() {
        let f = VisibilityFilter::new();
        let l = layer(resource("topp", "states", true), false);
        assert!(f.is_layer_hidden(&l, Some(&caps())));
        assert!(!f.is_layer_hidden(&l, Some(&get_map())));
        assert!(!f.is_layer_hidden(&l, Some(&caps().with_context("topp/states"))));
    }

    #[test]
    fn advertised_layer_defers_to_resource() {
        let f = VisibilityFilter::new();
        let hidden = layer(resource("topp", "states", false), true);
        let shown = layer(resource("topp", "roads", true), true);
        assert!(f.is_layer_hidden(&hidden, Some(&caps())));
        assert!(!f.is_layer_hidden(&shown, Some(&caps())));
        assert!(!f.is_layer_hidden(&hidden, Some(&caps().with_context("topp/states"))));
    }

    #[test]
    fn absent_inputs_pass_through_as_absent() {
        let f = VisibilityFilter::new();
        assert!(f.filter_resource(None, Some(&caps())).is_none());
        assert!(f.filter_layer(None, Some(&caps())).is_none());
        assert!(f.filter_group(None, Some(&caps())).is_none());
    }

    #[test]
    fn list_filters_preserve_order() {
        let f = VisibilityFilter::new();
        let layers = vec![
            layer(resource("topp", "a", true), true),
            layer(resource("topp", "b", true), false),
            layer(resource("topp", "c", true), true),
        ];
        let kept: Vec<_> = f
            .filter_layers(layers.clone(), Some(&caps()))
            .iter()
            .map(|l| l.name.clone())
            .collect();
        assert_eq!(kept, ["a", "c"]);
        assert_eq!(f.filter_layers(layers, Some(&get_map())).len(), 3);
    }

    // ── groups ─────────────────────────────────────────────────────────────

    #[test]
    fn partially_hidden_group_gets_derived_view() {
        let f = VisibilityFilter::new();
        let a = layer(resource("topp", "a", true), true);
        let b = layer(resource("topp", "b", true), false);
        let c = layer(resource("topp", "c", true), true);
        let original = group(
            "base",
            vec![
                PublishedInfo::Layer(a),
                PublishedInfo::Layer(b),
                PublishedInfo::Layer(c),
            ],
        );

        let view = f
            .filter_group(Some(Arc::clone(&original)), Some(&caps()))
            .expect("group stays visible");

        assert!(!Arc::ptr_eq(&view, &original));
        assert_eq!(member_ids(&*view), ["l-a", "l-c"]);
        assert_eq!(member_ids(&*original), ["l-a", "l-b", "l-c"]);
        assert_eq!(view.id(), original.id());
        assert_eq!(view.name(), original.name());
        assert_eq!(view.title(), original.title());
        assert_eq!(view.abstract_text(), original.abstract_text());
        assert_eq!(view.mode(), original.mode());
        assert_eq!(view.workspace(), original.workspace());
    }

    #[test]
    fn fully_visible_group_is_returned_as_is() {
        let f = VisibilityFilter::new();
        let original = group(
            "base",
            vec![
                PublishedInfo::Layer(layer(resource("topp", "a", true), true)),
                PublishedInfo::Layer(layer(resource("topp", "b", false), false)),
            ],
        );
        let same = f.filter_group(Some(Arc::clone(&original)), Some(&get_map())).unwrap();
        assert!(Arc::ptr_eq(&same, &original));

        let all_advertised = group(
            "clean",
            vec![PublishedInfo::Layer(layer(resource("topp", "a", true), true))],
        );
        let same = f
            .filter_group(Some(Arc::clone(&all_advertised)), Some(&caps()))
            .unwrap();
        assert!(Arc::ptr_eq(&same, &all_advertised));
    }

    #[test]
    fn nested_groups_are_filtered_recursively() {
        let f = VisibilityFilter::new();
        let inner = group(
            "inner",
            vec![
                PublishedInfo::Layer(layer(resource("topp", "a", true), true)),
                PublishedInfo::Layer(layer(resource("topp", "b", false), true)),
            ],
        );
        let outer = group(
            "outer",
            vec![
                PublishedInfo::Group(Arc::clone(&inner)),
                PublishedInfo::Layer(layer(resource("topp", "c", true), true)),
            ],
        );

        let view = f.filter_group(Some(Arc::clone(&outer)), Some(&caps())).unwrap();
        // Same member count, but the nested group was rewritten, so the
        // outer group must not leak the hidden grandchild.
        assert!(!Arc::ptr_eq(&view, &outer));
        let nested = view.layers()[0].as_group().unwrap();
        assert_eq!(member_ids(&**nested), ["l-a"]);
        assert_eq!(member_ids(&*inner), ["l-a", "l-b"]);
    }

    #[test]
    fn hide_never_keeps_group_with_zero_members() {
        let f = VisibilityFilter::new();
        let g = group(
            "empty",
            vec![PublishedInfo::Layer(layer(resource("topp", "a", false), true))],
        );
        let view = f.filter_group(Some(g), Some(&caps())).unwrap();
        assert!(view.layers().is_empty());
    }

    #[test]
    fn hide_empty_hides_group_with_all_members_hidden() {
        let f = VisibilityFilter::with_group_policy(Arc::new(HideEmpty));
        let g = group(
            "empty",
            vec![PublishedInfo::Layer(layer(resource("topp", "a", false), true))],
        );
        assert!(f.filter_group(Some(Arc::clone(&g)), Some(&caps())).is_none());
        assert!(f.filter_group(Some(g), Some(&get_map())).is_some());
    }

    #[test]
    fn hidden_nested_group_is_dropped_from_parent() {
        let f = VisibilityFilter::with_group_policy(Arc::new(HideIfAllHidden));
        let inner = group(
            "inner",
            vec![PublishedInfo::Layer(layer(resource("topp", "a", false), true))],
        );
        let outer = group(
            "outer",
            vec![
                PublishedInfo::Group(inner),
                PublishedInfo::Layer(layer(resource("topp", "b", true), true)),
            ],
        );
        let view = f.filter_group(Some(outer), Some(&caps())).unwrap();
        assert_eq!(member_ids(&*view), ["l-b"]);
    }

    #[test]
    fn custom_policy_sees_original_and_filtered() {
        let shrunk =
            |g: &dyn LayerGroup, filtered: &[PublishedInfo]| filtered.len() < g.layers().len();
        let f = VisibilityFilter::with_group_policy(Arc::new(shrunk));
        let g = group(
            "mixed",
            vec![
                PublishedInfo::Layer(layer(resource("topp", "a", true), true)),
                PublishedInfo::Layer(layer(resource("topp", "b", true), false)),
            ],
        );
        assert!(f.filter_group(Some(g), Some(&caps())).is_none());
    }

    // ── query predicate ────────────────────────────────────────────────────

    #[test]
    fn predicate_not_added_outside_capabilities() {
        let f = VisibilityFilter::new();
        let base = Filter::property_equals("name", "states");
        let built = f.build_query_predicate(InfoKind::Layer, base, Some(&get_map()));
        assert!(built.is_cacheable());
        let built = f.build_query_predicate(InfoKind::Layer, Filter::Include, None);
        assert!(matches!(built, Filter::Include));
    }

    #[test]
    fn predicate_not_added_for_unsecured_kinds() {
        let f = VisibilityFilter::new();
        for kind in [InfoKind::Store, InfoKind::Style, InfoKind::Namespace, InfoKind::Workspace] {
            let built = f.build_query_predicate(kind, Filter::Include, Some(&caps()));
            assert!(matches!(built, Filter::Include), "{kind} must not be secured");
        }
    }

    #[test]
    fn predicate_matches_single_item_checks() {
        let f = VisibilityFilter::with_group_policy(Arc::new(HideEmpty));
        let requests = [caps(), caps().with_context("topp/a"), get_map()];
        let resources = [resource("topp", "a", true), resource("topp", "a", false)];
        for request in &requests {
            for r in &resources {
                for layer_advertised in [true, false] {
                    let l = layer(Arc::clone(r), layer_advertised);
                    let g = group("g", vec![PublishedInfo::Layer(Arc::clone(&l))]);

                    let cases = [
                        (
                            InfoKind::Resource,
                            CatalogInfo::Resource(Arc::clone(r)),
                            !f.is_resource_hidden(r, Some(request)),
                        ),
                        (
                            InfoKind::Layer,
                            CatalogInfo::Layer(Arc::clone(&l)),
                            !f.is_layer_hidden(&l, Some(request)),
                        ),
                        (
                            InfoKind::LayerGroup,
                            CatalogInfo::LayerGroup(Arc::clone(&g)),
                            f.filter_group(Some(Arc::clone(&g)), Some(request)).is_some(),
                        ),
                    ];
                    for (kind, info, expected) in cases {
                        let predicate =
                            f.build_query_predicate(kind, Filter::Include, Some(request));
                        assert_eq!(
                            predicate.evaluate(&info).unwrap(),
                            expected,
                            "{kind} under {request:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn predicate_is_volatile() {
        let f = VisibilityFilter::new();
        let built = f.build_query_predicate(
            InfoKind::Resource,
            Filter::property_equals("name", "states"),
            Some(&caps()),
        );
        assert!(!built.is_cacheable());
        match built {
            Filter::And(children) => assert_eq!(children.len(), 2),
            other => panic!("expected conjunction, got {other:?}"),
        }
    }

    #[test]
    fn predicate_rejects_unsupported_entries() {
        let f = VisibilityFilter::new();
        let predicate = f.build_query_predicate(InfoKind::Layer, Filter::Include, Some(&caps()));
        let store = CatalogInfo::Store(Arc::new(StoreInfo {
            id: "ds".into(),
            name: "ds".into(),
            workspace: "topp".into(),
            store_type: "PostGIS".into(),
            enabled: true,
        }));
        assert!(matches!(
            predicate.evaluate(&store),
            Err(CatalogError::UnsupportedFilterTarget(InfoKind::Store))
        ));
    }

    #[test]
    fn filter_info_passes_unsecured_kinds() {
        let f = VisibilityFilter::new();
        let store = CatalogInfo::Store(Arc::new(StoreInfo {
            id: "ds".into(),
            name: "ds".into(),
            workspace: "topp".into(),
            store_type: "PostGIS".into(),
            enabled: false,
        }));
        assert!(f.filter_info(store, Some(&caps())).is_some());
        let hidden = CatalogInfo::Resource(resource("topp", "a", false));
        assert!(f.filter_info(hidden, Some(&caps())).is_none());
    }
}
