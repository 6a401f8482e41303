//! Feed aggregation.
//!
//! Turns a flat collection of entries into a day-grouped, recency-ordered
//! view: filter first, then bucket by calendar day, then order. The date
//! range part of the filter is applied once an entry's instant is parsed.
//!
//! `aggregate` is a pure function of its inputs. It never mutates the
//! entries it is given, and value-equal inputs always produce value-equal
//! output.

use crate::analysis::filter::FilterSpec;
use crate::analysis::zone::DayZone;
use crate::error::FeedError;
use crate::models::{DayGroup, Entry, Feed, InvalidTimestampPolicy, SkippedEntry};
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Options that shape aggregation independently of the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Zone used to derive each entry's calendar day.
    pub zone: DayZone,
    pub on_invalid_timestamp: InvalidTimestampPolicy,
}

/// Groups and orders feed entries for display.
///
/// # Ordering
/// - Day groups: most recent day first.
/// - Within a day: most recent instant first. Entries with the same instant
///   are ordered by ascending `id`, so output never depends on input order.
///
/// # Duplicates
/// When several entries share an `id`, the first one in input order wins and
/// the rest are dropped with a warning.
#[derive(Debug, Clone, Default)]
pub struct FeedAggregator {
    options: AggregateOptions,
}

impl FeedAggregator {
    pub fn new(options: AggregateOptions) -> Self {
        Self { options }
    }

    /// Filter, group by day and order `entries`.
    ///
    /// # Errors
    /// Returns `FeedError::InvalidTimestamp` only under
    /// `InvalidTimestampPolicy::Fail`, for the first matching entry whose
    /// timestamp cannot be parsed.
    pub fn aggregate(&self, entries: &[Entry], filter: &FilterSpec) -> Result<Feed, FeedError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(entries.len());
        let mut buckets: BTreeMap<NaiveDate, Vec<(DateTime<FixedOffset>, &Entry)>> =
            BTreeMap::new();
        let mut skipped = Vec::new();

        for entry in entries {
            if !seen.insert(entry.id.as_str()) {
                warn!("Dropping duplicate entry id {}", entry.id);
                continue;
            }

            if !filter.matches(entry) {
                continue;
            }

            let instant = match entry.instant() {
                Ok(instant) => instant,
                Err(e) => match self.options.on_invalid_timestamp {
                    InvalidTimestampPolicy::Skip => {
                        warn!(
                            "Skipping entry {} with invalid timestamp {:?}: {}",
                            entry.id, entry.created_at, e
                        );
                        skipped.push(SkippedEntry {
                            id: entry.id.clone(),
                            created_at: entry.created_at.clone(),
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    InvalidTimestampPolicy::Fail => {
                        return Err(FeedError::InvalidTimestamp {
                            id: entry.id.clone(),
                            value: entry.created_at.clone(),
                            source: e,
                        });
                    }
                },
            };

            if !filter.in_range(&instant, self.options.zone) {
                continue;
            }

            buckets
                .entry(self.options.zone.day_of(&instant))
                .or_default()
                .push((instant, entry));
        }

        let days: Vec<DayGroup> = buckets
            .into_iter()
            .rev()
            .map(|(day, mut items)| {
                items.sort_by(|(a_at, a), (b_at, b)| {
                    b_at.cmp(a_at).then_with(|| a.id.cmp(&b.id))
                });
                DayGroup {
                    day,
                    entries: items.into_iter().map(|(_, e)| e.clone()).collect(),
                }
            })
            .collect();

        debug!(
            "Aggregated {} of {} entries into {} days ({} skipped)",
            days.iter().map(|d| d.entries.len()).sum::<usize>(),
            entries.len(),
            days.len(),
            skipped.len()
        );

        Ok(Feed { days, skipped })
    }
}
