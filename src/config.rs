use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Where the service finds its files and how many rows it shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Startup dataset CSV.
    pub data_path: PathBuf,
    /// Canonical model artifact location; uploads overwrite this path.
    pub model_path: PathBuf,
    /// Similar records returned alongside a prediction.
    pub neighbors: usize,
    /// Rows shown in dataset previews.
    pub sample_rows: usize,
    /// Seed for the random fallback sample. `None` draws from the OS.
    pub fallback_seed: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data").join("50_Startups.csv"),
            model_path: PathBuf::from("model").join("pipe.json"),
            neighbors: 3,
            sample_rows: 10,
            fallback_seed: None,
        }
    }
}

impl ServiceConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: ServiceConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }
}
