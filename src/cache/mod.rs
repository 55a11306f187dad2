//! Write-through caching of fetched record lists.
//!
//! This module is API-agnostic:
//! - Records are stored per query key as one JSON array
//! - The backing file is read once and rewritten in full on every store
//! - Load and save problems degrade caching instead of failing the run

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{CacheStorage, JsonFileStorage, NoopStorage};
pub use traits::{CacheSource, QueryKey};
