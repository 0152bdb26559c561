//! Reading per-image region lists from disk and merging folder results into
//! a results document keyed by rendering method.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use tracing::instrument;

use crate::{
    error::{CerError, Result},
    FolderCerResult, Region,
};

/// Loads every `<name>.json` region list in `dir`, keyed `<name>.<image_extension>`.
#[instrument(level = "debug")]
pub fn load_region_dir(
    dir: &Path,
    image_extension: &str,
) -> Result<BTreeMap<String, Vec<Region>>> {
    if !dir.is_dir() {
        return Err(CerError::NotADirectory(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|e| CerError::io(dir, e))?;

    let mut regions = BTreeMap::new();
    for entry in entries {
        let path = entry.map_err(|e| CerError::io(dir, e))?.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|it| it.to_str()) else {
            log::warn!("Skipping non UTF-8 file name {path:?}");
            continue;
        };
        let image_name = format!("{stem}.{image_extension}");
        regions.insert(image_name, read_regions(&path)?);
    }
    log::debug!("Loaded {} region lists from {dir:?}", regions.len());
    Ok(regions)
}

pub fn read_regions(path: &Path) -> Result<Vec<Region>> {
    let data = fs::read_to_string(path).map_err(|e| CerError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| CerError::json(path, e))
}

#[derive(Debug, Clone)]
pub struct ResultsDocument {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl ResultsDocument {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let data = fs::read_to_string(&path).map_err(|e| CerError::io(&path, e))?;
            let value: Value =
                serde_json::from_str(&data).map_err(|e| CerError::json(&path, e))?;
            match value {
                Value::Object(map) => map,
                _ => return Err(CerError::NotAnObject(path)),
            }
        } else {
            Map::new()
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, method: &str) -> Option<&Value> {
        self.entries.get(method)
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn insert(&mut self, method: impl Into<String>, result: &FolderCerResult) -> Result<()> {
        let value = serde_json::to_value(result).map_err(|e| CerError::json(&self.path, e))?;
        self.entries.insert(method.into(), value);
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|it| !it.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CerError::io(parent, e))?;
        }
        let data = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| CerError::json(&self.path, e))?;
        fs::write(&self.path, data).map_err(|e| CerError::io(&self.path, e))
    }
}
