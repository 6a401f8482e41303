//! Data models for the Frens timeline.
//!
//! This module contains the core data structures shared by the aggregator,
//! capture, directory, stats and report modules: feed entries, day groups
//! and the aggregated feed itself.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a feed entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Something done with one or more friends.
    Activity,
    /// Free-form remark, optionally about friends.
    #[default]
    Note,
    /// A friend record; the description is the friend's display name.
    Friend,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Activity => write!(f, "activity"),
            EntryKind::Note => write!(f, "note"),
            EntryKind::Friend => write!(f, "friend"),
        }
    }
}

impl EntryKind {
    /// Returns an emoji representation of the kind.
    pub fn emoji(&self) -> &'static str {
        match self {
            EntryKind::Activity => "⚡",
            EntryKind::Note => "📝",
            EntryKind::Friend => "👤",
        }
    }
}

/// What to do with an entry whose `createdAt` is not a valid instant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InvalidTimestampPolicy {
    /// Leave the entry out and report it through `Feed::skipped`.
    #[default]
    Skip,
    /// Abort aggregation with an error naming the entry.
    Fail,
}

/// A single timestamped record of the feed.
///
/// Accepts both the canonical field names and the short names used by the
/// web client (`type`, `desc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Opaque identifier, unique within a collection.
    pub id: String,
    #[serde(alias = "type")]
    pub kind: EntryKind,
    /// May be empty only for friend entries.
    #[serde(alias = "desc", default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub friends: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
    /// RFC 3339 instant, kept as received so malformed values can be
    /// handled by the aggregator's policy.
    #[serde(alias = "created_at")]
    pub created_at: String,
}

impl Entry {
    /// Creates an entry with no friend, tag or location references.
    pub fn new(
        id: impl Into<String>,
        kind: EntryKind,
        description: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            friends: Vec::new(),
            tags: Vec::new(),
            locations: Vec::new(),
            created_at: created_at.into(),
        }
    }

    pub fn with_friends<I, S>(mut self, friends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.friends = friends.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// Parses `created_at` as an RFC 3339 instant.
    pub fn instant(&self) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(self.created_at.trim())
    }
}

/// Entries sharing one calendar day, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroup {
    /// Serialized as `YYYY-MM-DD`.
    pub day: NaiveDate,
    pub entries: Vec<Entry>,
}

/// An entry left out of the feed because its timestamp could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub id: String,
    pub created_at: String,
    pub reason: String,
}

/// Result of aggregating a collection of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    /// Day groups, most recent day first.
    pub days: Vec<DayGroup>,
    /// Entries excluded under `InvalidTimestampPolicy::Skip`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

impl Feed {
    /// Total number of entries across all day groups.
    pub fn entry_count(&self) -> usize {
        self.days.iter().map(|d| d.entries.len()).sum()
    }

    /// Returns true when no entry made it into any day group.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Iterates entries in display order.
    #[allow(dead_code)] // Utility for consumers walking the flattened feed
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.days.iter().flat_map(|d| d.entries.iter())
    }
}
