//! `geoveil-middleware` – configuration plumbing.
//!
//! Carries configuration snapshots and change notifications between the
//! administrative path and the components that react to them, without
//! caring what the configuration means.
//!
//! # Modules
//!
//! - [`config_bus`] – broadcast stream of [`ConfigEvent`][geoveil_types::ConfigEvent]
//!   post-change notifications built on Tokio broadcast channels.
//! - [`config_store`] – [`ConfigStore`], the in-memory snapshot holder, and
//!   the [`ServiceConfigSource`] trait consumers depend on.

pub mod config_bus;
pub mod config_store;

pub use config_bus::{ConfigBus, ConfigReceiver};
pub use config_store::{ConfigStore, ServiceConfigSource};
