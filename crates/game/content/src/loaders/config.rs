//! Engine tuning loader.

use std::path::Path;

use tactics_core::TacticsConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`TacticsConfig`] from TOML files.
///
/// Every field is optional; missing keys keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<TacticsConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<TacticsConfig> {
        let config: TacticsConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.move_speed <= 0.0 {
            anyhow::bail!("move_speed must be positive, got {}", config.move_speed);
        }
        if config.max_search_iterations == 0 {
            anyhow::bail!("max_search_iterations must be at least 1");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "aggro_radius = 4").unwrap();
        writeln!(file, "move_speed = 2.5").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();

        assert_eq!(config.aggro_radius, 4);
        assert_eq!(config.move_speed, 2.5);
        assert_eq!(
            config.max_search_iterations,
            TacticsConfig::DEFAULT_MAX_SEARCH_ITERATIONS
        );
    }

    #[test]
    fn rejects_non_positive_speed() {
        let error = ConfigLoader::parse("move_speed = 0.0").unwrap_err();
        assert!(error.to_string().contains("move_speed"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let error = ConfigLoader::load(&path).unwrap_err();
        assert!(error.to_string().contains("absent.toml"));
    }
}
