use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::grid::edit::EditPolicy;
use crate::grid::selection::StaleKeys;
use crate::grid::window::Density;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for sort arrows and markers
    pub use_glyphs: bool,

    /// Show a row-number gutter
    pub show_row_numbers: bool,

    /// Row density preset: "compact", "normal", "comfortable"
    pub density: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: false,
            density: "normal".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Window the row set instead of materializing everything
    pub virtual_scroll: bool,

    /// Extra rows materialized above and below the viewport
    pub overscan: usize,

    /// "discard" keeps the historical silent-discard on a second edit;
    /// "block" refuses a new edit while one is pending
    pub edit_policy: String,

    /// "prune" reconciles selection against replaced data; "retain" keeps
    /// stale keys
    pub stale_keys: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            virtual_scroll: true,
            overscan: 2,
            edit_policy: "discard".to_string(),
            stale_keys: "prune".to_string(),
        }
    }
}

impl Config {
    /// Load from the default path, falling back to defaults when the file is
    /// missing. A malformed file logs a warning and falls back rather than
    /// refusing to start.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => {
                    debug!("loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("failed to load config from {:?}: {}", path, e);
                    Config::default()
                }
            },
            _ => Config::default(),
        }
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("failed to parse config: {:?}", path))
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path().context("no config directory available")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("datagrid").join("config.toml"))
    }

    pub fn density(&self) -> Density {
        match self.display.density.as_str() {
            "compact" => Density::Compact,
            "comfortable" => Density::Comfortable,
            _ => Density::Normal,
        }
    }

    pub fn edit_policy(&self) -> EditPolicy {
        match self.behavior.edit_policy.as_str() {
            "block" => EditPolicy::Block,
            _ => EditPolicy::DiscardPending,
        }
    }

    pub fn stale_keys(&self) -> StaleKeys {
        match self.behavior.stale_keys.as_str() {
            "retain" => StaleKeys::Retain,
            _ => StaleKeys::Prune,
        }
    }
}
