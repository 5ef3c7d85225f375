use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::FmdlError;
use crate::presets::preset;
use crate::validation::limits::{DEFAULT_MESH_LIMIT, MIN_MESH_LIMIT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub split_meshes: bool,
    /// Per-part vertex and index limit.
    pub limit: usize,
    pub anti_blur: bool,
    /// Look up and probe texture files next to the model.
    pub load_textures: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            split_meshes: true,
            limit: DEFAULT_MESH_LIMIT,
            anti_blur: true,
            load_textures: true,
        }
    }
}

impl ImportOptions {
    pub fn validate(&self) -> Result<(), FmdlError> {
        validate_limit(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub split_meshes: bool,
    pub limit: usize,
    pub anti_blur: bool,
    /// Preset used for materials without shader settings.
    pub default_preset: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            split_meshes: true,
            limit: DEFAULT_MESH_LIMIT,
            anti_blur: true,
            default_preset: "blin_basic".to_string(),
        }
    }
}

impl ExportOptions {
    pub fn validate(&self) -> Result<(), FmdlError> {
        validate_limit(self.limit)?;
        if preset(&self.default_preset).is_none() {
            return Err(FmdlError::Options(format!(
                "unknown material preset '{}'",
                self.default_preset
            )));
        }
        Ok(())
    }
}

fn validate_limit(limit: usize) -> Result<(), FmdlError> {
    if limit < MIN_MESH_LIMIT {
        return Err(FmdlError::Options(format!(
            "limit must be at least {}, got {}",
            MIN_MESH_LIMIT, limit
        )));
    }
    Ok(())
}

/// Read options from a JSON file. Missing fields keep their defaults.
pub fn load_options<T: DeserializeOwned>(path: &Path) -> Result<T, FmdlError> {
    let text = fs::read_to_string(path).map_err(|e| FmdlError::io(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| FmdlError::Options(format!("{}: {}", path.display(), e)))
}
