//! # Application Configuration
//!
//! Read once at startup from a YAML file, then overridden from the environment.
//!
//! ```yaml
//! base_namespace: app.actions     # required
//! static_asset_path: /static      # default /static
//! dynamic_asset_path: /assets/dynamic
//! index_uri: /index
//! mount_prefix: /shop             # default: mounted at the server root
//! static_dir: ./public            # directory served below static_asset_path
//! dynamic_dir: ./views            # templates rendered below dynamic_asset_path
//! addr: 0.0.0.0:8080
//! ```
//!
//! | Variable | Field |
//! |---|---|
//! | `CHAINROUTE_BASE_NAMESPACE` | `base_namespace` |
//! | `CHAINROUTE_STATIC_ASSET_PATH` | `static_asset_path` |
//! | `CHAINROUTE_DYNAMIC_ASSET_PATH` | `dynamic_asset_path` |
//! | `CHAINROUTE_INDEX_URI` | `index_uri` |
//! | `CHAINROUTE_MOUNT_PREFIX` | `mount_prefix` |
//! | `CHAINROUTE_ADDR` | `addr` |

use crate::context::ContextSettings;
use crate::dispatcher::normalize_mount_prefix;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_namespace: String,
    pub static_asset_path: Option<String>,
    pub dynamic_asset_path: Option<String>,
    pub index_uri: Option<String>,
    pub mount_prefix: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub dynamic_dir: Option<PathBuf>,
    pub addr: Option<String>,
}

impl AppConfig {
    /// Load `path` and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load `path` without looking at the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigurationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields with values from `lookup`; blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("CHAINROUTE_BASE_NAMESPACE") {
            self.base_namespace = v;
        }
        if let Some(v) = get("CHAINROUTE_STATIC_ASSET_PATH") {
            self.static_asset_path = Some(v);
        }
        if let Some(v) = get("CHAINROUTE_DYNAMIC_ASSET_PATH") {
            self.dynamic_asset_path = Some(v);
        }
        if let Some(v) = get("CHAINROUTE_INDEX_URI") {
            self.index_uri = Some(v);
        }
        if let Some(v) = get("CHAINROUTE_MOUNT_PREFIX") {
            self.mount_prefix = Some(v);
        }
        if let Some(v) = get("CHAINROUTE_ADDR") {
            self.addr = Some(v);
        }
    }

    /// Settings for the [`ResolutionContext`](crate::context::ResolutionContext).
    #[must_use]
    pub fn context_settings(&self) -> ContextSettings {
        ContextSettings {
            base_namespace: self.base_namespace.clone(),
            static_asset_path: self.static_asset_path.clone(),
            dynamic_asset_path: self.dynamic_asset_path.clone(),
            index_uri: self.index_uri.clone(),
        }
    }

    /// Normalized mount prefix: `""` at the server root, otherwise `/prefix`.
    #[must_use]
    pub fn mount_prefix(&self) -> String {
        normalize_mount_prefix(self.mount_prefix.as_deref().unwrap_or(""))
    }

    #[must_use]
    pub fn addr(&self) -> &str {
        self.addr.as_deref().unwrap_or(DEFAULT_ADDR)
    }
}
