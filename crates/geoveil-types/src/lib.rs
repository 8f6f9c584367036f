//! `geoveil-types` – shared vocabulary for the visibility layer.
//!
//! # Modules
//!
//! - [`catalog`] – catalog entries ([`ResourceInfo`], [`LayerInfo`], the
//!   [`LayerGroup`] read contract, [`PublishedInfo`] members and the
//!   heterogeneous [`CatalogInfo`]).
//! - [`query`] – the [`Filter`] expression language used by bulk queries,
//!   including [`VolatileFunction`] for per-entry computed values.
//! - [`reader`] – [`CatalogReader`], the read surface every catalog provider
//!   (and every filtering decorator) implements.
//! - [`process`] – [`ProcessProvider`] and [`ProcessRegistry`].
//! - [`request`] – the [`Request`] being served.
//! - [`service`] – processing service configuration and [`ConfigEvent`]
//!   change notifications.

use thiserror::Error;

pub mod catalog;
pub mod process;
pub mod query;
pub mod reader;
pub mod request;
pub mod service;

pub use catalog::{
    CatalogInfo, InfoKind, LayerGroup, LayerGroupInfo, LayerGroupMode, LayerInfo, NamespaceInfo,
    PublishedInfo, ResourceInfo, StoreInfo, StyleInfo, WorkspaceInfo,
};
pub use process::{ProcessProvider, ProcessRegistry};
pub use query::{Expression, Filter, Value, VolatileFunction};
pub use reader::CatalogReader;
pub use request::{GET_CAPABILITIES, Request};
pub use service::{ConfigEvent, ProcessGroupInfo, ProcessingServiceConfig, ServiceChange};

/// Errors shared by the catalog, query and configuration layers.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Can't build filter for objects of type {0}")]
    UnsupportedFilterTarget(InfoKind),

    #[error("Unknown property '{property}' for {kind}")]
    UnknownProperty { kind: InfoKind, property: String },

    #[error("Catalog Fixture Error: {0}")]
    Fixture(String),

    #[error("Configuration Channel Error: {0}")]
    Channel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_error_display() {
        let err = CatalogError::UnsupportedFilterTarget(InfoKind::Store);
        assert!(err.to_string().contains("StoreInfo"));

        let err = CatalogError::UnknownProperty {
            kind: InfoKind::Layer,
            property: "colour".into(),
        };
        assert!(err.to_string().contains("colour"));
        assert!(err.to_string().contains("LayerInfo"));
    }
}
