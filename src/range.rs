use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use std::fmt;

/// Inclusive time window used to select activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  start: DateTime<Utc>,
  end: DateTime<Utc>,
}

impl DateRange {
  /// Build a range, returning None when `start` is after `end`.
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
    (start <= end).then_some(Self { start, end })
  }

  /// The window covering the last `days` days up to `now`, or None when
  /// its start would fall before the earliest representable date.
  pub fn last_days(days: u32, now: DateTime<Utc>) -> Option<Self> {
    let start = TimeDelta::try_days(i64::from(days)).and_then(|d| now.checked_sub_signed(d))?;
    Some(Self { start, end: now })
  }

  pub fn start(&self) -> DateTime<Utc> {
    self.start
  }

  pub fn end(&self) -> DateTime<Utc> {
    self.end
  }

  pub fn start_day(&self) -> NaiveDate {
    self.start.date_naive()
  }

  pub fn end_day(&self) -> NaiveDate {
    self.end.date_naive()
  }

  /// Both ends are inclusive.
  pub fn contains(&self, t: DateTime<Utc>) -> bool {
    self.start <= t && t <= self.end
  }
}

impl fmt::Display for DateRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} to {}",
      self.start_day().format("%Y-%m-%d"),
      self.end_day().format("%Y-%m-%d")
    )
  }
}
