//! Runtime configuration for the demo binaries.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::detector::SpineParams;
use crate::geometry::Point;

#[derive(Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub json_out: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
pub struct RuntimeConfig {
    /// JSON file holding the raw skeleton to adapt.
    pub skeleton_path: PathBuf,
    /// Grayscale image providing the scoring field.
    pub field_path: PathBuf,
    /// Seed points to grow spines from.
    pub seeds: Vec<Point>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub spine_params: SpineParams,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}
