//! Load the catalog from a data directory. Toons are required; every other
//! file falls back to empty when missing so partial data sets stay usable.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::data::catalog::{Catalog, StatMappings};
use crate::data::records::{ItemsFile, ToonsFile, TrinketsFile, TwistedsFile};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DATA_DIR_ENV: &str = "TOONCALC_DATA_DIR";

pub const STAT_MAPPINGS_FILE: &str = "stat-mappings.json";
pub const TOONS_FILE: &str = "toons.json";
pub const TRINKETS_FILE: &str = "trinkets.json";
pub const ITEMS_FILE: &str = "items.json";
pub const TWISTEDS_FILE: &str = "twisteds.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse json '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to parse yaml '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Data directory from `TOONCALC_DATA_DIR`, or `data`.
pub fn data_dir_from_env() -> PathBuf {
    env::var(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn load_optional<T: DeserializeOwned + Default>(path: &Path) -> Result<T, CatalogError> {
    if !path.exists() {
        warn!(path = %path.display(), "catalog file missing; using empty set");
        return Ok(T::default());
    }
    load_json(path)
}

/// Load and normalize every catalog file under `dir`.
pub fn load_catalog(dir: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    let dir = dir.as_ref();
    let toons: ToonsFile = load_json(&dir.join(TOONS_FILE))?;
    let stat_mappings: StatMappings = load_optional(&dir.join(STAT_MAPPINGS_FILE))?;
    let trinkets: TrinketsFile = load_optional(&dir.join(TRINKETS_FILE))?;
    let items: ItemsFile = load_optional(&dir.join(ITEMS_FILE))?;
    let twisteds: TwistedsFile = load_optional(&dir.join(TWISTEDS_FILE))?;

    Ok(Catalog {
        stat_mappings,
        toons: toons.toons.into_iter().map(|t| t.into_toon()).collect(),
        trinkets: trinkets
            .trinkets
            .into_iter()
            .map(|t| t.into_trinket())
            .collect(),
        items: items.items.into_iter().map(|i| i.into_item()).collect(),
        twisteds: twisteds
            .twisteds
            .into_iter()
            .map(|t| t.into_twisted())
            .collect(),
    })
}
