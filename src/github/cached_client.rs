//! Cached GitHub client that wraps the raw API with transparent caching.

use tracing::debug;

use crate::cache::{CacheLayer, CacheSource, CacheStorage};
use crate::error::FetchError;
use crate::range::DateRange;

use super::cache::PullRequestsKey;
use super::client::PullRequestApi;
use super::types::{PullRequest, Repository};

/// Only the first page is fetched; older activity is out of reach.
const FIRST_PAGE: u32 = 1;

/// GitHub client with transparent caching support.
///
/// Results are cached per repository and calendar-day range. A cached
/// entry is trusted as-is and never re-validated against GitHub.
pub struct CachedGitHubClient<A, S: CacheStorage> {
  inner: A,
  cache: CacheLayer<S>,
}

impl<A: PullRequestApi, S: CacheStorage> CachedGitHubClient<A, S> {
  pub fn new(inner: A, storage: S) -> Self {
    Self {
      inner,
      cache: CacheLayer::new(storage),
    }
  }

  /// All pull requests of `repository` updated within `range`, newest first.
  pub async fn fetch_all_activity(
    &self,
    repository: &Repository,
    range: &DateRange,
  ) -> Result<Vec<PullRequest>, FetchError> {
    let key = PullRequestsKey::new(repository, range);

    let result = self
      .cache
      .fetch_list(&key, || async move {
        let pulls = self.inner.list_pull_requests(repository, FIRST_PAGE).await?;
        let fetched = pulls.len();

        let records: Vec<PullRequest> = pulls
          .into_iter()
          .filter(|pr| range.contains(pr.updated_at))
          .map(|pr| pr.into_record(repository))
          .collect();

        debug!(
          "Kept {} of {} pull requests from {} within {}",
          records.len(),
          fetched,
          repository,
          range
        );
        Ok::<_, FetchError>(records)
      })
      .await?;

    if result.source == CacheSource::Cache {
      debug!("[CACHE] Using cached data for {}", repository);
    }

    Ok(result.data)
  }

  /// Pull requests opened by `author`, filtered from `fetch_all_activity`.
  pub async fn fetch_by_author(
    &self,
    repository: &Repository,
    author: &str,
    range: &DateRange,
  ) -> Result<Vec<PullRequest>, FetchError> {
    let all = self.fetch_all_activity(repository, range).await?;
    Ok(all.into_iter().filter(|pr| pr.author == author).collect())
  }
}
