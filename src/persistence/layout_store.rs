use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::grid::column::ColumnLayout;
use crate::utils::app_paths::AppPaths;

/// Stores one column layout per view as a JSON file
pub struct LayoutStore {
    dir: PathBuf,
}

impl LayoutStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the application's data directory
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(AppPaths::layouts_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for a view; anything outside `[A-Za-z0-9_-]` becomes '_'
    pub fn path_for(&self, view: &str) -> PathBuf {
        let file_name: String = view
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }

    /// Load a saved layout; `None` when the view has never been saved
    pub fn load(&self, view: &str) -> Result<Option<ColumnLayout>> {
        let path = self.path_for(view);
        if !path.exists() {
            debug!("No saved layout for '{}'", view);
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read layout {}", path.display()))?;
        let layout: ColumnLayout = serde_json::from_str(&content)
            .with_context(|| format!("Invalid layout {}", path.display()))?;
        debug!("Loaded layout for '{}' ({} columns)", view, layout.len());
        Ok(Some(layout))
    }

    pub fn save(&self, view: &str, layout: &ColumnLayout) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(view);
        let content = serde_json::to_string_pretty(layout)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write layout {}", path.display()))?;
        info!("Saved layout for '{}' to {}", view, path.display());
        Ok(())
    }

    /// Forget a view's layout; true if one existed
    pub fn remove(&self, view: &str) -> Result<bool> {
        let path = self.path_for(view);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }
}
