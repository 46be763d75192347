//! Data-driven floor content and loaders.
//!
//! This crate is the floor generation boundary of the tactical core:
//! - Floor layouts (bounds, walls, interactables, unit spawns) from RON
//! - Engine tuning (`TacticsConfig`) from TOML
//!
//! Loaded values are plain `tactics-core` types; nothing here touches a
//! running battlefield.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, FloorLoader, LoadResult};
