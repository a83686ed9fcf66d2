//! Configuration file for the paddock shell

use std::path::Path;

use paddock_core::{Error, NavigationConfig, RoutingConfig};
use serde::Deserialize;

/// Contents of `paddock.toml`. Both tables are optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaddockConfig {
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl PaddockConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config file: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }
}
