use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::model::Place;

/// On-disk home of the single saved place.
///
/// One TOML record; a later save replaces the earlier one.
#[derive(Debug, Clone)]
pub struct PlaceStore {
    path: PathBuf,
}

impl PlaceStore {
    /// Store rooted at the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "sunnyweather", "sunny")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self::open_at(dirs.data_dir()))
    }

    /// Store rooted at an explicit directory.
    pub fn open_at(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join("place.toml") }
    }

    pub fn save(&self, place: &Place) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(place).context("Failed to serialize place to TOML")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write place file: {}", self.path.display()))?;

        debug!(name = %place.name, "saved place");
        Ok(())
    }

    pub fn load(&self) -> Result<Option<Place>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read place file: {}", self.path.display()))?;

        let place: Place = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse place file: {}", self.path.display()))?;

        Ok(Some(place))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
