//! Configuration – reads `~/.geoveil/config.toml`.

use geoveil_kernel::GroupVisibilityMode;
use geoveil_types::ProcessingServiceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Persisted configuration stored in `~/.geoveil/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Which built-in rule decides whether a filtered group is hidden.
    #[serde(default)]
    pub group_policy: GroupVisibilityMode,

    /// TOML catalog fixture to serve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,

    /// Processing service settings (enabled groups, filtered processes).
    #[serde(default)]
    pub processing: ProcessingServiceConfig,
}

/// Return the path to `~/.geoveil/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".geoveil").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: Config = toml::from_str(&raw)?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Load from `path`, falling back to defaults (plus overrides) when the file
/// is missing.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    match load_from(path)? {
        Some(cfg) => Ok(cfg),
        None => {
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            Ok(cfg)
        }
    }
}

/// Apply `GEOVEIL_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `GEOVEIL_GROUP_POLICY` | `group_policy` |
/// | `GEOVEIL_CATALOG` | `catalog_path` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("GEOVEIL_GROUP_POLICY") {
        match v.parse::<GroupVisibilityMode>() {
            Ok(mode) => cfg.group_policy = mode,
            Err(e) => warn!(error = %e, "ignoring GEOVEIL_GROUP_POLICY"),
        }
    }
    if let Ok(v) = std::env::var("GEOVEIL_CATALOG")
        && !v.is_empty()
    {
        cfg.catalog_path = Some(PathBuf::from(v));
    }
}
