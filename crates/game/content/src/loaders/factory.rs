//! Content factory for loading floors and tuning from a data directory.

use std::path::{Path, PathBuf};

use tactics_core::{FloorLayout, TacticsConfig};

use crate::loaders::{ConfigLoader, FloorLoader, LoadResult};

/// Content factory that loads game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── floors/
///     ├── training_ground.ron
///     └── chokepoint.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine tuning from `config.toml`, falling back to defaults when
    /// the file does not exist.
    pub fn load_config(&self) -> LoadResult<TacticsConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(TacticsConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load a floor from `floors/{floor_name}.ron`.
    pub fn load_floor(&self, floor_name: &str) -> LoadResult<FloorLayout> {
        let path = self
            .data_dir
            .join("floors")
            .join(format!("{}.ron", floor_name));
        FloorLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
