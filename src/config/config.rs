use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::grid::column::MergePolicy;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paging: PagingConfig,
    pub columns: ColumnConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Page size used when a view is first opened
    pub default_page_size: usize,

    /// Page sizes offered in the density picker
    pub page_size_options: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Append non-navigable schema fields as hidden columns
    pub include_hidden_fields: bool,

    /// Save column order/visibility between sessions
    pub persist_layout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is not set
    pub filter: String,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            page_size_options: vec![10, 25, 50, 100],
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            include_hidden_fields: false,
            persist_layout: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ColumnConfig {
    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy {
            include_hidden_fields: self.include_hidden_fields,
        }
    }
}

impl Config {
    /// Load config from the default location, writing defaults if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.normalize();
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("tracker-grid").join("config.toml"))
    }

    /// Fix values that would break paging
    fn normalize(&mut self) {
        if self.paging.default_page_size == 0 {
            warn!("default_page_size = 0 in config, using 1");
            self.paging.default_page_size = 1;
        }
        self.paging.page_size_options.retain(|&size| size > 0);
        self.paging.page_size_options.sort_unstable();
        self.paging.page_size_options.dedup();
    }

    pub fn create_default_with_comments() -> String {
        r#"# Tracker grid configuration
# Location: ~/.config/tracker-grid/config.toml (Linux)

[paging]
# Rows per page when a view opens
default_page_size = 25

# Page sizes offered in the density picker
page_size_options = [10, 25, 50, 100]

[columns]
# Show schema fields that are hidden by default in the column picker
include_hidden_fields = false

# Remember column order and visibility per view
persist_layout = true

[logging]
# Used when RUST_LOG is not set, e.g. "debug" or "tracker_grid=trace"
filter = "info"
"#
        .to_string()
    }
}
