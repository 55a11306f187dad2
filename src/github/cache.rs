//! Cache keys for GitHub queries.

use chrono::NaiveDate;

use crate::cache::QueryKey;
use crate::range::DateRange;

use super::types::Repository;

/// Pull requests of one repository over a range of calendar days.
///
/// Only the days of the range take part in the key, so every run on the
/// same day with the same lookback shares one entry.
#[derive(Clone, Debug)]
pub struct PullRequestsKey<'a> {
  pub repository: &'a Repository,
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl<'a> PullRequestsKey<'a> {
  pub fn new(repository: &'a Repository, range: &DateRange) -> Self {
    Self {
      repository,
      start: range.start_day(),
      end: range.end_day(),
    }
  }
}

impl QueryKey for PullRequestsKey<'_> {
  fn cache_key(&self) -> String {
    format!(
      "{}_{}_{}",
      self.repository,
      self.start.format("%Y%m%d"),
      self.end.format("%Y%m%d")
    )
  }

  fn description(&self) -> String {
    format!("pull requests in {} from {} to {}", self.repository, self.start, self.end)
  }
}
