//! Catalog entries as seen by the read side.
//!
//! Every entry is owned by the external catalog store and handed out behind
//! an [`Arc`], so filters can return the very same object they were given
//! (pointer identity is preserved) or wrap it in a derived view without ever
//! mutating the stored value.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::CatalogError;
use crate::query::Value;

// ────────────────────────────────────────────────────────────────────────────
// Plain entries (never filtered for visibility)
// ────────────────────────────────────────────────────────────────────────────

/// An XML-style namespace: short `prefix` plus its full `uri`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceInfo {
    pub id: String,
    pub prefix: String,
    pub uri: String,
}

/// Administrative container for stores, styles and groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub id: String,
    pub name: String,
}

/// A data store (database connection, file directory, remote service …).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInfo {
    pub id: String,
    pub name: String,
    /// Name of the owning workspace.
    pub workspace: String,
    /// Free-form store type, e.g. `"PostGIS"` or `"GeoTIFF"`.
    pub store_type: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleInfo {
    pub id: String,
    pub name: String,
    pub workspace: Option<String>,
    pub filename: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Resources and layers
// ────────────────────────────────────────────────────────────────────────────

/// A published data set (feature type, coverage, …).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub id: String,
    /// Local name inside [`ResourceInfo::namespace`].
    pub name: String,
    pub namespace: NamespaceInfo,
    /// Id of the backing store, when known.
    pub store: Option<String>,
    pub title: Option<String>,
    pub enabled: bool,
    /// Whether the resource shows up in capabilities documents.
    pub advertised: bool,
}

impl ResourceInfo {
    /// `prefix:name`, the qualified name used by OGC services.
    pub fn prefixed_name(&self) -> String {
        format!("{}:{}", self.namespace.prefix, self.name)
    }

    /// `prefix/name`, the path of the resource-specific virtual service.
    pub fn scope_key(&self) -> String {
        format!("{}/{}", self.namespace.prefix, self.name)
    }
}

/// A layer publishes exactly one [`ResourceInfo`].
///
/// The layer carries its own `advertised` flag which is independent from the
/// resource's flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    pub id: String,
    pub name: String,
    pub resource: Arc<ResourceInfo>,
    pub default_style: Option<String>,
    pub enabled: bool,
    pub advertised: bool,
}

impl LayerInfo {
    pub fn prefixed_name(&self) -> String {
        format!("{}:{}", self.resource.namespace.prefix, self.name)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layer groups
// ────────────────────────────────────────────────────────────────────────────

/// How a layer group is exposed to clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerGroupMode {
    /// Shown as a single opaque layer.
    #[default]
    Single,
    /// Named tree; members are listed as children.
    Named,
    /// Tree without its own rendering, only a container for members.
    Container,
    /// Earth-observation mode: a root layer plus its members.
    Eo,
}

/// Read contract of a layer group.
///
/// [`LayerGroupInfo`] is the stored implementation. Filters may return other
/// implementations that override [`LayerGroup::layers`] while delegating every
/// other attribute to the stored group.
pub trait LayerGroup: fmt::Debug + Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn title(&self) -> Option<&str>;
    fn abstract_text(&self) -> Option<&str>;
    fn mode(&self) -> LayerGroupMode;
    /// Name of the owning workspace; `None` for global groups.
    fn workspace(&self) -> Option<&str>;
    /// Ordered members of the group.
    fn layers(&self) -> &[PublishedInfo];

    /// `workspace:name` for workspace-local groups, `name` otherwise.
    fn prefixed_name(&self) -> String {
        match self.workspace() {
            Some(ws) => format!("{ws}:{}", self.name()),
            None => self.name().to_string(),
        }
    }
}

/// The stored layer group.
#[derive(Debug, Clone)]
pub struct LayerGroupInfo {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub mode: LayerGroupMode,
    pub workspace: Option<String>,
    pub layers: Vec<PublishedInfo>,
}

impl LayerGroup for LayerGroupInfo {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    fn mode(&self) -> LayerGroupMode {
        self.mode
    }

    fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    fn layers(&self) -> &[PublishedInfo] {
        &self.layers
    }
}

/// A member of a layer group: either a leaf layer or a nested group.
#[derive(Debug, Clone)]
pub enum PublishedInfo {
    Layer(Arc<LayerInfo>),
    Group(Arc<dyn LayerGroup>),
}

impl PublishedInfo {
    pub fn id(&self) -> &str {
        match self {
            PublishedInfo::Layer(layer) => &layer.id,
            PublishedInfo::Group(group) => group.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PublishedInfo::Layer(layer) => &layer.name,
            PublishedInfo::Group(group) => group.name(),
        }
    }

    pub fn as_layer(&self) -> Option<&Arc<LayerInfo>> {
        match self {
            PublishedInfo::Layer(layer) => Some(layer),
            PublishedInfo::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Arc<dyn LayerGroup>> {
        match self {
            PublishedInfo::Group(group) => Some(group),
            PublishedInfo::Layer(_) => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Heterogeneous entries
// ────────────────────────────────────────────────────────────────────────────

/// Discriminant of [`CatalogInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoKind {
    Workspace,
    Namespace,
    Store,
    Style,
    Resource,
    Layer,
    LayerGroup,
}

impl fmt::Display for InfoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InfoKind::Workspace => "WorkspaceInfo",
            InfoKind::Namespace => "NamespaceInfo",
            InfoKind::Store => "StoreInfo",
            InfoKind::Style => "StyleInfo",
            InfoKind::Resource => "ResourceInfo",
            InfoKind::Layer => "LayerInfo",
            InfoKind::LayerGroup => "LayerGroupInfo",
        };
        f.write_str(name)
    }
}

/// Any catalog entry; the element type of bulk queries.
#[derive(Debug, Clone)]
pub enum CatalogInfo {
    Workspace(Arc<WorkspaceInfo>),
    Namespace(Arc<NamespaceInfo>),
    Store(Arc<StoreInfo>),
    Style(Arc<StyleInfo>),
    Resource(Arc<ResourceInfo>),
    Layer(Arc<LayerInfo>),
    LayerGroup(Arc<dyn LayerGroup>),
}

impl CatalogInfo {
    pub fn kind(&self) -> InfoKind {
        match self {
            CatalogInfo::Workspace(_) => InfoKind::Workspace,
            CatalogInfo::Namespace(_) => InfoKind::Namespace,
            CatalogInfo::Store(_) => InfoKind::Store,
            CatalogInfo::Style(_) => InfoKind::Style,
            CatalogInfo::Resource(_) => InfoKind::Resource,
            CatalogInfo::Layer(_) => InfoKind::Layer,
            CatalogInfo::LayerGroup(_) => InfoKind::LayerGroup,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CatalogInfo::Workspace(ws) => &ws.id,
            CatalogInfo::Namespace(ns) => &ns.id,
            CatalogInfo::Store(store) => &store.id,
            CatalogInfo::Style(style) => &style.id,
            CatalogInfo::Resource(resource) => &resource.id,
            CatalogInfo::Layer(layer) => &layer.id,
            CatalogInfo::LayerGroup(group) => group.id(),
        }
    }

    /// Namespaces are named by their prefix, everything else by its name.
    pub fn name(&self) -> &str {
        match self {
            CatalogInfo::Workspace(ws) => &ws.name,
            CatalogInfo::Namespace(ns) => &ns.prefix,
            CatalogInfo::Store(store) => &store.name,
            CatalogInfo::Style(style) => &style.name,
            CatalogInfo::Resource(resource) => &resource.name,
            CatalogInfo::Layer(layer) => &layer.name,
            CatalogInfo::LayerGroup(group) => group.name(),
        }
    }

    /// Look up a queryable property by name.
    ///
    /// `id` and `name` exist on every kind; the remaining properties only on
    /// the kinds that carry them.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnknownProperty`] when `property` is not defined for
    /// this kind of entry.
    pub fn property(&self, property: &str) -> Result<Value, CatalogError> {
        let value = match (self, property) {
            (_, "id") => Some(Value::from(self.id())),
            (_, "name") => Some(Value::from(self.name())),
            (CatalogInfo::Namespace(ns), "uri") => Some(Value::from(ns.uri.as_str())),
            (CatalogInfo::Store(store), "enabled") => Some(Value::Bool(store.enabled)),
            (CatalogInfo::Store(store), "workspace") => Some(Value::from(store.workspace.as_str())),
            (CatalogInfo::Store(store), "type") => Some(Value::from(store.store_type.as_str())),
            (CatalogInfo::Style(style), "workspace") => {
                Some(Value::from(style.workspace.as_deref()))
            }
            (CatalogInfo::Resource(r), "enabled") => Some(Value::Bool(r.enabled)),
            (CatalogInfo::Resource(r), "advertised") => Some(Value::Bool(r.advertised)),
            (CatalogInfo::Resource(r), "prefixedName") => Some(Value::Text(r.prefixed_name())),
            (CatalogInfo::Resource(r), "namespace.prefix") => {
                Some(Value::from(r.namespace.prefix.as_str()))
            }
            (CatalogInfo::Resource(r), "store") => Some(Value::from(r.store.as_deref())),
            (CatalogInfo::Layer(l), "enabled") => Some(Value::Bool(l.enabled)),
            (CatalogInfo::Layer(l), "advertised") => Some(Value::Bool(l.advertised)),
            (CatalogInfo::Layer(l), "prefixedName") => Some(Value::Text(l.prefixed_name())),
            (CatalogInfo::Layer(l), "resource.id") => Some(Value::from(l.resource.id.as_str())),
            (CatalogInfo::Layer(l), "resource.namespace.prefix") => {
                Some(Value::from(l.resource.namespace.prefix.as_str()))
            }
            (CatalogInfo::LayerGroup(g), "workspace") => Some(Value::from(g.workspace())),
            (CatalogInfo::LayerGroup(g), "prefixedName") => Some(Value::Text(g.prefixed_name())),
            (CatalogInfo::LayerGroup(g), "title") => Some(Value::from(g.title())),
            _ => None,
        };
        value.ok_or_else(|| CatalogError::UnknownProperty {
            kind: self.kind(),
            property: property.to_string(),
        })
    }
}

impl From<PublishedInfo> for CatalogInfo {
    fn from(published: PublishedInfo) -> Self {
        match published {
            PublishedInfo::Layer(layer) => CatalogInfo::Layer(layer),
            PublishedInfo::Group(group) => CatalogInfo::LayerGroup(group),
        }
    }
}
