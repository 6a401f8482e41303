//! Feed statistics.
//!
//! This module computes summary statistics over a collection of entries:
//! per-kind counts, the most referenced friends, tags and locations, and a
//! monthly activity timeline.

use crate::analysis::zone::DayZone;
use crate::models::{Entry, EntryKind};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Headline counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCounts {
    /// Distinct friends, from friend entries and friend references.
    pub friends: usize,
    /// Distinct location references.
    pub locations: usize,
    pub activities: usize,
    pub notes: usize,
}

/// A friend, tag or location ranked by how many entries reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    pub name: String,
    pub count: usize,
    /// Most recent valid timestamp among referencing entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<FixedOffset>>,
}

/// Activity and note counts for one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub month: String,
    pub activities: usize,
    pub notes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedStats {
    pub counts: FeedCounts,
    pub top_friends: Vec<RankedItem>,
    pub top_tags: Vec<RankedItem>,
    pub top_locations: Vec<RankedItem>,
    /// Ascending by month.
    pub timeline: Vec<TimelinePoint>,
}

impl FeedStats {
    /// Computes statistics for `entries`, keeping `top_n` items per ranking.
    ///
    /// Entries with malformed timestamps are still counted, but contribute
    /// neither a `last_activity` nor a timeline point. Duplicate ids count
    /// once, for the first entry seen, as in the aggregated feed.
    pub fn from_entries(entries: &[Entry], zone: DayZone, top_n: usize) -> Self {
        let mut seen: HashSet<&str> = HashSet::with_capacity(entries.len());
        let mut counts = FeedCounts::default();
        let mut friends: BTreeSet<&str> = BTreeSet::new();
        let mut locations: BTreeSet<&str> = BTreeSet::new();
        let mut friend_refs = Tally::default();
        let mut tag_refs = Tally::default();
        let mut location_refs = Tally::default();
        let mut months: BTreeMap<String, (usize, usize)> = BTreeMap::new();

        for entry in entries {
            if !seen.insert(entry.id.as_str()) {
                debug!("Ignoring duplicate entry id {} in stats", entry.id);
                continue;
            }

            let instant = entry.instant().ok();

            match entry.kind {
                EntryKind::Activity => counts.activities += 1,
                EntryKind::Note => counts.notes += 1,
                EntryKind::Friend => {
                    let name = entry.description.trim();
                    if !name.is_empty() {
                        friends.insert(name);
                    }
                }
            }

            for friend in &entry.friends {
                friends.insert(friend);
                friend_refs.record(friend, instant);
            }
            for tag in &entry.tags {
                tag_refs.record(tag, instant);
            }
            for location in &entry.locations {
                locations.insert(location);
                location_refs.record(location, instant);
            }

            if let (Some(at), EntryKind::Activity | EntryKind::Note) = (instant, entry.kind) {
                let month = zone.day_of(&at).format("%Y-%m").to_string();
                let point = months.entry(month).or_default();
                match entry.kind {
                    EntryKind::Activity => point.0 += 1,
                    _ => point.1 += 1,
                }
            }
        }

        counts.friends = friends.len();
        counts.locations = locations.len();

        let timeline = months
            .into_iter()
            .map(|(month, (activities, notes))| TimelinePoint {
                month,
                activities,
                notes,
            })
            .collect();

        debug!(
            "Computed stats over {} entries ({} friends, {} locations)",
            seen.len(),
            counts.friends,
            counts.locations
        );

        Self {
            counts,
            top_friends: friend_refs.top(top_n),
            top_tags: tag_refs.top(top_n),
            top_locations: location_refs.top(top_n),
            timeline,
        }
    }
}

#[derive(Default)]
struct Tally<'a> {
    items: HashMap<&'a str, (usize, Option<DateTime<FixedOffset>>)>,
}

impl<'a> Tally<'a> {
    fn record(&mut self, name: &'a str, at: Option<DateTime<FixedOffset>>) {
        let slot = self.items.entry(name).or_insert((0, None));
        slot.0 += 1;
        if at > slot.1 {
            slot.1 = at;
        }
    }

    /// Ranked by count (highest first), then by name.
    fn top(self, n: usize) -> Vec<RankedItem> {
        let mut ranked: Vec<RankedItem> = self
            .items
            .into_iter()
            .map(|(name, (count, last_activity))| RankedItem {
                name: name.to_string(),
                count,
                last_activity,
            })
            .collect();

        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        ranked.truncate(n);
        ranked
    }
}
