//! `geoveil-kernel` – visibility and capability decisions.
//!
//! Sits between callers and the catalog / process registry. It does not
//! store anything; it decides what each request is allowed to see.
//!
//! # Modules
//!
//! - [`visibility`] – [`VisibilityFilter`][visibility::VisibilityFilter]:
//!   hides non-advertised resources and layers from capabilities requests,
//!   filters layer groups recursively and builds the equivalent query
//!   predicate for bulk listings.
//! - [`group_policy`] – [`GroupVisibilityPolicy`][group_policy::GroupVisibilityPolicy]:
//!   pluggable rule deciding whether a group survives once its members have
//!   been filtered.
//! - [`filtered_group`] – [`FilteredLayerGroup`][filtered_group::FilteredLayerGroup]:
//!   the derived, read-only group view with an overridden member list.
//! - [`advertised_catalog`] – [`AdvertisedCatalog`][advertised_catalog::AdvertisedCatalog]:
//!   a [`CatalogReader`][geoveil_types::CatalogReader] decorator applying the
//!   visibility filter to every accessor.
//! - [`capability_gate`] – [`CapabilityGate`][capability_gate::CapabilityGate]:
//!   keeps the disabled-process set in step with configuration changes.
//! - [`process_selector`] – [`ProcessSelector`][process_selector::ProcessSelector]:
//!   the process registry as seen through the capability gate.

pub mod advertised_catalog;
pub mod capability_gate;
pub mod filtered_group;
pub mod group_policy;
pub mod process_selector;
pub mod visibility;

pub use advertised_catalog::{AdvertisedCatalog, AdvertisedView};
pub use capability_gate::{CapabilityGate, GateSubscription};
pub use filtered_group::FilteredLayerGroup;
pub use group_policy::{
    GroupVisibilityMode, GroupVisibilityPolicy, HideEmpty, HideIfAllHidden, HideNever,
};
pub use process_selector::ProcessSelector;
pub use visibility::VisibilityFilter;
