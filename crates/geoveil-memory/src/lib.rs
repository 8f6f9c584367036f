//! `geoveil-memory` – in-memory catalog and process registry.
//!
//! The backing stores the visibility layer decorates in tests and in the CLI.
//!
//! # Modules
//!
//! - [`catalog`] – [`MemoryCatalog`][catalog::MemoryCatalog]: a plain
//!   [`CatalogReader`][geoveil_types::CatalogReader] over vectors of shared
//!   entries, with filter evaluation for `list` queries.
//! - [`process_registry`] – [`StaticProcessRegistry`][process_registry::StaticProcessRegistry]:
//!   a fixed set of process providers keyed by factory name.
//! - [`fixture`] – [`Fixture`][fixture::Fixture]: loads both of the above from
//!   a TOML document, resolving cross references by name.

pub mod catalog;
pub mod fixture;
pub mod process_registry;

pub use catalog::MemoryCatalog;
pub use fixture::Fixture;
pub use process_registry::{StaticProcessRegistry, StaticProvider};
