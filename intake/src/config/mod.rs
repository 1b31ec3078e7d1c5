use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use telemon_utils::logger::LoggerConfig;

use crate::api::config::ApiConfig;
use crate::storage::StorageConfig;

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,

    pub storage: StorageConfig,

    pub logger: LoggerConfig,
}

impl AppConfig {
    /// Reads the config file if given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: Self = match path {
            Some(path) => telemon_utils::serde::load_json_from_file(path)
                .context("failed to load service config")?,
            None => Self::default(),
        };
        config.api.apply_env()?;
        Ok(config)
    }
}
