//! TOML catalog fixtures.
//!
//! A fixture describes a whole catalog plus the installed process providers.
//! Entries reference each other by name; references are resolved in
//! declaration order, so a nested layer group must be declared before the
//! group that contains it (which also rules out cycles).
//!
//! ```toml
//! [[namespaces]]
//! prefix = "topp"
//! uri = "http://www.openplans.org/topp"
//!
//! [[resources]]
//! namespace = "topp"
//! name = "states"
//! advertised = false
//!
//! [[layers]]
//! resource = "topp:states"
//!
//! [[layer_groups]]
//! name = "base"
//! members = [{ layer = "topp:states" }]
//!
//! [[process_providers]]
//! key = "geo"
//! processes = ["geo:buffer", "geo:area"]
//! ```

use std::path::Path;

use geoveil_types::{
    CatalogError, CatalogReader, LayerGroupInfo, LayerGroupMode, LayerInfo, NamespaceInfo,
    PublishedInfo, ResourceInfo, StoreInfo, StyleInfo, WorkspaceInfo,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::MemoryCatalog;
use crate::process_registry::{StaticProcessRegistry, StaticProvider};

fn default_true() -> bool {
    true
}

fn generated_id(kind: &str) -> String {
    format!("{kind}-{}", Uuid::new_v4())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkspaceEntry {
    id: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NamespaceEntry {
    id: Option<String>,
    prefix: String,
    uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreEntry {
    id: Option<String>,
    name: String,
    workspace: String,
    #[serde(rename = "type", default)]
    store_type: String,
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleEntry {
    id: Option<String>,
    name: String,
    workspace: Option<String>,
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceEntry {
    id: Option<String>,
    /// Namespace prefix.
    namespace: String,
    name: String,
    /// Store name.
    store: Option<String>,
    title: Option<String>,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_true")]
    advertised: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerEntry {
    id: Option<String>,
    /// `prefix:name` of the published resource.
    resource: String,
    /// Defaults to the resource name.
    name: Option<String>,
    default_style: Option<String>,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_true")]
    advertised: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MemberRef {
    /// `prefix:name` or plain layer name.
    Layer(String),
    /// `workspace:name` or plain name of a previously declared group.
    Group(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerGroupEntry {
    id: Option<String>,
    name: String,
    workspace: Option<String>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    mode: LayerGroupMode,
    #[serde(default)]
    members: Vec<MemberRef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderEntry {
    key: String,
    #[serde(default)]
    processes: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureDocument {
    #[serde(default)]
    workspaces: Vec<WorkspaceEntry>,
    #[serde(default)]
    namespaces: Vec<NamespaceEntry>,
    #[serde(default)]
    stores: Vec<StoreEntry>,
    #[serde(default)]
    styles: Vec<StyleEntry>,
    #[serde(default)]
    resources: Vec<ResourceEntry>,
    #[serde(default)]
    layers: Vec<LayerEntry>,
    #[serde(default)]
    layer_groups: Vec<LayerGroupEntry>,
    #[serde(default)]
    process_providers: Vec<ProviderEntry>,
}

/// A loaded fixture.
#[derive(Debug, Default)]
pub struct Fixture {
    pub catalog: MemoryCatalog,
    pub processes: StaticProcessRegistry,
}

impl Fixture {
    /// Read and resolve the fixture at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Fixture(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&raw)
    }

    /// Parse and resolve a fixture document.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Fixture`] on malformed TOML or on a reference to an
    /// undeclared namespace, store, resource, layer or group.
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let doc: FixtureDocument = toml::from_str(raw)
            .map_err(|e| CatalogError::Fixture(format!("Failed to parse fixture: {e}")))?;
        let mut catalog = MemoryCatalog::new();

        for ws in doc.workspaces {
            catalog.add_workspace(WorkspaceInfo {
                id: ws.id.unwrap_or_else(|| generated_id("WorkspaceInfo")),
                name: ws.name,
            });
        }

        for ns in doc.namespaces {
            catalog.add_namespace(NamespaceInfo {
                id: ns.id.unwrap_or_else(|| generated_id("NamespaceInfo")),
                prefix: ns.prefix,
                uri: ns.uri,
            });
        }

        for store in doc.stores {
            if catalog.workspace(&store.workspace).is_none() {
                return Err(unresolved("workspace", &store.workspace, &store.name));
            }
            catalog.add_store(StoreInfo {
                id: store.id.unwrap_or_else(|| generated_id("StoreInfo")),
                name: store.name,
                workspace: store.workspace,
                store_type: store.store_type,
                enabled: store.enabled,
            });
        }

        for style in doc.styles {
            catalog.add_style(StyleInfo {
                id: style.id.unwrap_or_else(|| generated_id("StyleInfo")),
                name: style.name,
                workspace: style.workspace,
                filename: style.filename,
            });
        }

        for r in doc.resources {
            let namespace = catalog
                .namespace(&r.namespace)
                .ok_or_else(|| unresolved("namespace", &r.namespace, &r.name))?;
            let store = match r.store {
                Some(store_name) => Some(
                    catalog
                        .stores()
                        .into_iter()
                        .find(|s| s.name == store_name)
                        .map(|s| s.id.clone())
                        .ok_or_else(|| unresolved("store", &store_name, &r.name))?,
                ),
                None => None,
            };
            catalog.add_resource(ResourceInfo {
                id: r.id.unwrap_or_else(|| generated_id("ResourceInfo")),
                name: r.name,
                namespace: (*namespace).clone(),
                store,
                title: r.title,
                enabled: r.enabled,
                advertised: r.advertised,
            });
        }

        for l in doc.layers {
            let (prefix, local) = l
                .resource
                .split_once(':')
                .ok_or_else(|| CatalogError::Fixture(format!(
                    "layer resource '{}' must be written as prefix:name",
                    l.resource
                )))?;
            let resource = catalog
                .resource_by_name(prefix, local)
                .ok_or_else(|| unresolved("resource", &l.resource, "layer"))?;
            catalog.add_layer(LayerInfo {
                id: l.id.unwrap_or_else(|| generated_id("LayerInfo")),
                name: l.name.unwrap_or_else(|| resource.name.clone()),
                resource,
                default_style: l.default_style,
                enabled: l.enabled,
                advertised: l.advertised,
            });
        }

        for g in doc.layer_groups {
            let mut layers = Vec::with_capacity(g.members.len());
            for member in &g.members {
                let published = match member {
                    MemberRef::Layer(name) => catalog
                        .layer_by_name(name)
                        .map(PublishedInfo::Layer)
                        .ok_or_else(|| unresolved("layer", name, &g.name))?,
                    MemberRef::Group(name) => {
                        let (workspace, local) = match name.split_once(':') {
                            Some((ws, local)) => (Some(ws), local),
                            None => (None, name.as_str()),
                        };
                        catalog
                            .layer_group_by_name(workspace, local)
                            .map(PublishedInfo::Group)
                            .ok_or_else(|| unresolved("layer group", name, &g.name))?
                    }
                };
                layers.push(published);
            }
            catalog.add_layer_group(LayerGroupInfo {
                id: g.id.unwrap_or_else(|| generated_id("LayerGroupInfo")),
                name: g.name,
                title: g.title,
                abstract_text: g.abstract_text,
                mode: g.mode,
                workspace: g.workspace,
                layers,
            });
        }

        let mut processes = StaticProcessRegistry::new();
        for p in doc.process_providers {
            processes.register(StaticProvider::new(p.key, p.processes));
        }

        debug!(
            layers = catalog.layers().len(),
            groups = catalog.layer_groups().len(),
            "catalog fixture loaded"
        );
        Ok(Self { catalog, processes })
    }
}

fn unresolved(what: &str, name: &str, referenced_by: &str) -> CatalogError {
    CatalogError::Fixture(format!("unknown {what} '{name}' referenced by '{referenced_by}'"))
}
