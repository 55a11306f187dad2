//! Cache layer that orchestrates caching logic with network fetching.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::traits::{CacheResult, Cacheable, QueryKey};

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between an API client and its callers. Cached entries
/// never go stale: a hit is returned as-is without asking the network.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// Fetch a list with cache-first strategy.
  ///
  /// 1. Check cache - on hit, return immediately
  /// 2. On miss, fetch from network (errors propagate, nothing is stored)
  /// 3. Write the fetched list through to storage; a failed write is logged only
  pub async fn fetch_list<T, K, F, Fut, E>(
    &self,
    key: &K,
    fetcher: F,
  ) -> Result<CacheResult<Vec<T>>, E>
  where
    T: Cacheable,
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    let cache_key = key.cache_key();

    if let Some(cached) = self.storage.get::<T>(&cache_key) {
      debug!(key = %cache_key, "Cache hit for {}", key.description());
      return Ok(CacheResult::from_cache(cached));
    }

    debug!(key = %cache_key, "Cache miss for {}", key.description());
    let data = fetcher().await?;

    if let Err(e) = self.storage.put(&cache_key, &data) {
      warn!(key = %cache_key, "Could not save cache: {}", e);
    }

    Ok(CacheResult::from_network(data))
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}
