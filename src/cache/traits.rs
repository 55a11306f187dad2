//! Core traits and types for the caching system.

use serde::{de::DeserializeOwned, Serialize};

/// Records that can be persisted in the cache file.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {}

impl<T> Cacheable for T where T: Clone + Send + Sync + Serialize + DeserializeOwned {}

/// Identifies one cached query result.
pub trait QueryKey {
  /// Stable key under which the result is stored.
  fn cache_key(&self) -> String;

  /// Human-readable description for logs.
  fn description(&self) -> String;
}

/// Result from a cache operation, including where the data came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  pub data: T,
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
    }
  }

  pub fn from_cache(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
    }
  }
}

/// Indicates where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched from the remote API during this call
  Network,
  /// Served from the cache file, not re-validated
  Cache,
}
