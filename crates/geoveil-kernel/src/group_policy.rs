//! [`GroupVisibilityPolicy`] – decides whether a layer group survives once
//! its members have been filtered.
//!
//! The policy sees the original group and the members that are still
//! visible, in order. It must be deterministic in those two inputs.

use std::sync::Arc;

use geoveil_types::{LayerGroup, PublishedInfo};
use serde::{Deserialize, Serialize};

pub trait GroupVisibilityPolicy: Send + Sync {
    /// Return `true` to hide `group` entirely given its `filtered` members.
    fn hide_group(&self, group: &dyn LayerGroup, filtered: &[PublishedInfo]) -> bool;
}

/// Never hide a group, even when none of its members is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct HideNever;

impl GroupVisibilityPolicy for HideNever {
    fn hide_group(&self, _group: &dyn LayerGroup, _filtered: &[PublishedInfo]) -> bool {
        false
    }
}

/// Hide a group whose filtered member list is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct HideEmpty;

impl GroupVisibilityPolicy for HideEmpty {
    fn hide_group(&self, _group: &dyn LayerGroup, filtered: &[PublishedInfo]) -> bool {
        filtered.is_empty()
    }
}

/// Hide a group only when it had members and every one of them was hidden.
/// Groups that were empty to begin with stay visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct HideIfAllHidden;

impl GroupVisibilityPolicy for HideIfAllHidden {
    fn hide_group(&self, group: &dyn LayerGroup, filtered: &[PublishedInfo]) -> bool {
        filtered.is_empty() && !group.layers().is_empty()
    }
}

impl<F> GroupVisibilityPolicy for F
where
    F: Fn(&dyn LayerGroup, &[PublishedInfo]) -> bool + Send + Sync,
{
    fn hide_group(&self, group: &dyn LayerGroup, filtered: &[PublishedInfo]) -> bool {
        self(group, filtered)
    }
}

/// Configuration-friendly selector for the built-in policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupVisibilityMode {
    #[default]
    HideNever,
    HideEmpty,
    HideIfAllHidden,
}

impl GroupVisibilityMode {
    pub fn policy(self) -> Arc<dyn GroupVisibilityPolicy> {
        match self {
            GroupVisibilityMode::HideNever => Arc::new(HideNever),
            GroupVisibilityMode::HideEmpty => Arc::new(HideEmpty),
            GroupVisibilityMode::HideIfAllHidden => Arc::new(HideIfAllHidden),
        }
    }
}

impl std::str::FromStr for GroupVisibilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "hide_never" => Ok(GroupVisibilityMode::HideNever),
            "hide_empty" => Ok(GroupVisibilityMode::HideEmpty),
            "hide_if_all_hidden" => Ok(GroupVisibilityMode::HideIfAllHidden),
            other => Err(format!("unknown group visibility policy '{other}'")),
        }
    }
}
