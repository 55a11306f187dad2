//! Cache storage trait and JSON file implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, warn};

use super::traits::Cacheable;

/// Errors from reading or writing the cache file.
///
/// These are never fatal: a failed load leaves the store empty and a
/// failed save only loses persistence.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Outcome of loading the cache file at startup.
#[derive(Debug)]
pub enum CacheLoad {
  /// File read and parsed
  Loaded { entries: usize },
  /// No file yet, starting empty
  Missing,
  /// File present but unusable, starting empty
  Degraded(CacheError),
}

impl fmt::Display for CacheLoad {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheLoad::Loaded { entries } => write!(f, "loaded {} entries", entries),
      CacheLoad::Missing => write!(f, "no cache file, starting empty"),
      CacheLoad::Degraded(e) => write!(f, "unreadable cache, starting empty: {}", e),
    }
  }
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Get the records stored under `key`.
  fn get<T: Cacheable>(&self, key: &str) -> Option<Vec<T>>;

  /// Store `records` under `key`, replacing any previous entry.
  fn put<T: Cacheable>(&self, key: &str, records: &[T]) -> Result<(), CacheError>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get<T: Cacheable>(&self, _key: &str) -> Option<Vec<T>> {
    None // Always miss
  }

  fn put<T: Cacheable>(&self, _key: &str, _records: &[T]) -> Result<(), CacheError> {
    Ok(()) // Discard
  }
}

/// Cache backed by a single JSON file mapping keys to record arrays.
///
/// The whole file is read once on open and rewritten on every `put`.
/// Writes are synchronous and happen under the lock, so concurrent stores
/// queue behind each other; the file holds one entry per repository and
/// range, which keeps each rewrite small.
pub struct JsonFileStorage {
  path: PathBuf,
  entries: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStorage {
  /// Open the cache at `path`, logging how the load went.
  pub fn open(path: impl Into<PathBuf>) -> Self {
    let (storage, outcome) = Self::load(path);
    match &outcome {
      CacheLoad::Degraded(_) => warn!(path = %storage.path.display(), "{}", outcome),
      _ => debug!(path = %storage.path.display(), "{}", outcome),
    }
    storage
  }

  /// Open the cache at `path` and report the load outcome to the caller.
  pub fn load(path: impl Into<PathBuf>) -> (Self, CacheLoad) {
    let path = path.into();
    let (entries, outcome) = match read_entries(&path) {
      Ok(Some(entries)) => {
        let count = entries.len();
        (entries, CacheLoad::Loaded { entries: count })
      }
      Ok(None) => (BTreeMap::new(), CacheLoad::Missing),
      Err(e) => (BTreeMap::new(), CacheLoad::Degraded(e)),
    };

    let storage = Self {
      path,
      entries: Mutex::new(entries),
    };
    (storage, outcome)
  }

  /// Get the default cache file path.
  pub fn default_path() -> Option<PathBuf> {
    dirs::cache_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".cache")))
      .map(|dir| dir.join("standup").join("github_cache.json"))
  }

  fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
    // The map is only replaced wholesale, so a poisoned guard still holds a usable map.
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn save(&self, entries: &BTreeMap<String, Value>) -> Result<(), CacheError> {
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }

    let json = serde_json::to_vec_pretty(entries)?;
    let tmp = self.path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, &self.path)?;
    Ok(())
  }
}

impl CacheStorage for JsonFileStorage {
  fn get<T: Cacheable>(&self, key: &str) -> Option<Vec<T>> {
    let entries = self.lock();
    let value = entries.get(key)?;

    match serde_json::from_value(value.clone()) {
      Ok(records) => Some(records),
      Err(e) => {
        warn!(key, "Ignoring cache entry with unexpected shape: {}", e);
        None
      }
    }
  }

  fn put<T: Cacheable>(&self, key: &str, records: &[T]) -> Result<(), CacheError> {
    let value = serde_json::to_value(records)?;

    let mut entries = self.lock();
    entries.insert(key.to_string(), value);
    self.save(&entries)
  }
}

/// Read the cache file; `Ok(None)` when it does not exist.
fn read_entries(path: &Path) -> Result<Option<BTreeMap<String, Value>>, CacheError> {
  let contents = match std::fs::read_to_string(path) {
    Ok(contents) => contents,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(e.into()),
  };

  Ok(Some(serde_json::from_str(&contents)?))
}
