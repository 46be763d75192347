//! Content loaders for reading floor data from files.
//!
//! Floors are RON, engine tuning is TOML. Both loaders produce `tactics-core`
//! types directly.

pub mod config;
pub mod factory;
pub mod floor;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use floor::FloorLoader;

use std::path::Path;

use anyhow::Context;

/// Loader result; failures carry the offending path in their context chain.
pub type LoadResult<T> = anyhow::Result<T>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
