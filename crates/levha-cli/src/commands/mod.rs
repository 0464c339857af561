//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;
pub mod recover;

use std::path::{Path, PathBuf};

use levha_core::LevhaConfig;
use tracing::debug;

/// Default config location, `$CONFIG_DIR/levha/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("levha")
        .join("config.json")
}

/// Config from `--config`, else the default file when present, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<LevhaConfig> {
    if let Some(path) = path {
        return Ok(LevhaConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(LevhaConfig::from_file(&default_path)?)
    } else {
        Ok(LevhaConfig::default())
    }
}

/// Lowercased file extension, empty when missing.
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
