//! Processing service configuration and its change notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_true() -> bool {
    true
}

/// An administrative group of processes sharing one provider (factory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessGroupInfo {
    /// Key used to resolve the provider in the process registry.
    pub factory: String,
    /// When `false` every process the provider exposes is disabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Individually disabled process names; only consulted when the group
    /// is enabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filtered_processes: Vec<String>,
}

impl ProcessGroupInfo {
    pub fn enabled(factory: impl Into<String>) -> Self {
        Self {
            factory: factory.into(),
            enabled: true,
            filtered_processes: Vec::new(),
        }
    }

    pub fn disabled(factory: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::enabled(factory)
        }
    }

    pub fn with_filtered<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filtered_processes = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Snapshot of the processing service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingServiceConfig {
    #[serde(default)]
    pub process_groups: Vec<ProcessGroupInfo>,
}

/// Which service configuration changed, carrying the new snapshot when it is
/// one this workspace understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServiceChange {
    Processing(ProcessingServiceConfig),
    /// Any other service (e.g. `"WMS"`); listeners interested in processing
    /// configuration ignore it.
    Other { service: String },
}

/// A post-change notification routed over the configuration bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub change: ServiceChange,
}

impl ConfigEvent {
    pub fn new(change: ServiceChange) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            change,
        }
    }
}
