use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

pub struct AppPaths;

impl AppPaths {
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join("tracker-grid");

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn layouts_dir() -> Result<PathBuf> {
        let layouts_dir = Self::data_dir()?.join("layouts");
        fs::create_dir_all(&layouts_dir)?;
        Ok(layouts_dir)
    }
}
