//! Engine tuning constants. Defaults match the live game; a YAML or JSON file
//! named by `TOONCALC_CONFIG` can override any subset of them.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::loader::CatalogError;
use crate::machine::completion::CompletionModel;

pub const CONFIG_ENV: &str = "TOONCALC_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Ceiling on run speed for the capped movement trinket.
    pub run_speed_cap: f64,
    pub max_stack_count: u32,
    pub stamina_regen_base: f64,
    pub machine: CompletionModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_speed_cap: 40.0,
            max_stack_count: 10,
            stamina_regen_base: 2.4,
            machine: CompletionModel::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config file; `.yaml`/`.yml` as YAML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<EngineConfig, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if is_yaml {
            serde_yaml::from_str(&raw).map_err(|source| CatalogError::Yaml {
                path: path.display().to_string(),
                source,
            })
        } else {
            serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
                path: path.display().to_string(),
                source,
            })
        }
    }

    /// Config from `TOONCALC_CONFIG`, or defaults when unset or unreadable.
    pub fn from_env() -> EngineConfig {
        let Ok(path) = env::var(CONFIG_ENV) else {
            return EngineConfig::default();
        };
        match EngineConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "falling back to default engine config");
                EngineConfig::default()
            }
        }
    }
}
