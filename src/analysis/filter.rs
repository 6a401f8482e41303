//! Faceted feed filter.
//!
//! A `FilterSpec` restricts the feed by kind scope, by three facets
//! (friends, tags, locations) and by an optional date range. Facets are
//! conjunctive across dimensions and disjunctive within one: "any of these
//! friends AND any of these tags AND any of these locations". An empty facet
//! places no restriction.
//!
//! The value is immutable from the outside; every `with_*` call consumes
//! the filter and returns a new one.

use crate::analysis::zone::DayZone;
use crate::error::FeedError;
use crate::models::{Entry, EntryKind};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Kind restriction. At most one is active at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// No kind restriction
    #[default]
    All,
    /// Only activities
    #[value(name = "activities")]
    ActivitiesOnly,
    /// Only notes
    #[value(name = "notes")]
    NotesOnly,
}

impl ScopeKind {
    /// Whether entries of `kind` pass this scope.
    pub fn admits(&self, kind: EntryKind) -> bool {
        match self {
            ScopeKind::All => true,
            ScopeKind::ActivitiesOnly => kind == EntryKind::Activity,
            ScopeKind::NotesOnly => kind == EntryKind::Note,
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::All => write!(f, "all"),
            ScopeKind::ActivitiesOnly => write!(f, "activities only"),
            ScopeKind::NotesOnly => write!(f, "notes only"),
        }
    }
}

/// One end of a date range.
///
/// A bare day is compared against the entry's calendar day in the feed's
/// zone; an instant is compared against the entry's instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateBound {
    Day(NaiveDate),
    Instant(DateTime<FixedOffset>),
}

impl DateBound {
    fn is_after(&self, instant: &DateTime<FixedOffset>, zone: DayZone) -> bool {
        match self {
            DateBound::Day(day) => zone.day_of(instant) < *day,
            DateBound::Instant(at) => instant < at,
        }
    }

    fn is_before(&self, instant: &DateTime<FixedOffset>, zone: DayZone) -> bool {
        match self {
            DateBound::Day(day) => zone.day_of(instant) > *day,
            DateBound::Instant(at) => instant > at,
        }
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateBound::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            DateBound::Instant(at) => write!(f, "{}", at.to_rfc3339()),
        }
    }
}

impl FromStr for DateBound {
    type Err = FeedError;

    /// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(DateBound::Day(day));
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(DateBound::Instant)
            .map_err(|_| FeedError::InvalidDate(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    friends: BTreeSet<String>,
    tags: BTreeSet<String>,
    locations: BTreeSet<String>,
    scope: ScopeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    since: Option<DateBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    until: Option<DateBound>,
}

impl FilterSpec {
    /// A filter that admits every entry.
    pub fn new() -> Self {
        Self::default()
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

    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = scope;
        self
    }

    /// Inclusive lower bound.
    pub fn with_since(mut self, since: Option<DateBound>) -> Self {
        self.since = since;
        self
    }

    /// Inclusive upper bound.
    pub fn with_until(mut self, until: Option<DateBound>) -> Self {
        self.until = until;
        self
    }

    pub fn friends(&self) -> &BTreeSet<String> {
        &self.friends
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn locations(&self) -> &BTreeSet<String> {
        &self.locations
    }

    pub fn scope(&self) -> ScopeKind {
        self.scope
    }

    pub fn since(&self) -> Option<DateBound> {
        self.since
    }

    pub fn until(&self) -> Option<DateBound> {
        self.until
    }

    /// True when the filter admits every entry.
    pub fn is_unrestricted(&self) -> bool {
        self.scope == ScopeKind::All
            && self.friends.is_empty()
            && self.tags.is_empty()
            && self.locations.is_empty()
            && self.since.is_none()
            && self.until.is_none()
    }

    /// Whether `entry` passes the scope and every non-empty facet.
    ///
    /// The date range needs a parsed instant and is checked separately by
    /// `in_range`.
    pub fn matches(&self, entry: &Entry) -> bool {
        self.scope.admits(entry.kind)
            && facet_matches(&self.friends, &entry.friends)
            && facet_matches(&self.tags, &entry.tags)
            && facet_matches(&self.locations, &entry.locations)
    }

    /// Whether `instant` lies within `since..=until`, with bare days taken
    /// in `zone`.
    pub fn in_range(&self, instant: &DateTime<FixedOffset>, zone: DayZone) -> bool {
        !self.since.is_some_and(|b| b.is_after(instant, zone))
            && !self.until.is_some_and(|b| b.is_before(instant, zone))
    }
}

fn facet_matches(wanted: &BTreeSet<String>, refs: &[String]) -> bool {
    wanted.is_empty() || refs.iter().any(|r| wanted.contains(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office_activity() -> Entry {
        Entry::new("1", EntryKind::Activity, "Diversity Day", "2024-01-02T10:00:00Z")
            .with_friends(["Michael Scott"])
            .with_tags(["#office"])
            .with_locations(["@Scranton"])
    }

    #[test]
    fn test_empty_filter_admits_everything() {
        let filter = FilterSpec::new();
        assert!(filter.is_unrestricted());
        assert!(filter.matches(&office_activity()));
        assert!(filter.matches(&Entry::new("2", EntryKind::Friend, "", "2024-01-02T10:00:00Z")));
    }

    #[test]
    fn test_scope_restricts_kind() {
        let entry = office_activity();
        assert!(FilterSpec::new()
            .with_scope(ScopeKind::ActivitiesOnly)
            .matches(&entry));
        assert!(!FilterSpec::new()
            .with_scope(ScopeKind::NotesOnly)
            .matches(&entry));

        let friend = Entry::new("3", EntryKind::Friend, "Pam", "2024-01-02T10:00:00Z");
        assert!(!FilterSpec::new()
            .with_scope(ScopeKind::ActivitiesOnly)
            .matches(&friend));
    }

    #[test]
    fn test_facet_is_any_of_its_values() {
        let filter = FilterSpec::new().with_friends(["Jim Halpert", "Michael Scott"]);
        assert!(filter.matches(&office_activity()));

        let filter = FilterSpec::new().with_friends(["Jim Halpert"]);
        assert!(!filter.matches(&office_activity()));
    }

    #[test]
    fn test_facets_are_conjunctive() {
        let filter = FilterSpec::new()
            .with_tags(["#office"])
            .with_locations(["@NYC"]);
        assert!(!filter.matches(&office_activity()));

        let filter = FilterSpec::new()
            .with_tags(["#office"])
            .with_locations(["@Scranton"]);
        assert!(filter.matches(&office_activity()));
    }

    #[test]
    fn test_entry_without_refs_fails_non_empty_facet() {
        let bare = Entry::new("2", EntryKind::Note, "plain", "2024-01-02T09:00:00Z");
        assert!(!FilterSpec::new().with_tags(["#office"]).matches(&bare));
        assert!(!FilterSpec::new().with_friends(["Pam Beesly"]).matches(&bare));
    }

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_date_bound_parsing() {
        assert_eq!(
            "2024-01-02".parse::<DateBound>().unwrap(),
            DateBound::Day(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        assert_eq!(
            "2024-01-02T10:00:00+02:00".parse::<DateBound>().unwrap(),
            DateBound::Instant(at("2024-01-02T08:00:00Z"))
        );
        assert!(matches!(
            "last tuesday".parse::<DateBound>(),
            Err(FeedError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_day_range_is_inclusive_at_both_ends() {
        let day = |d: u32| DateBound::Day(NaiveDate::from_ymd_opt(2024, 1, d).unwrap());
        let filter = FilterSpec::new()
            .with_since(Some(day(2)))
            .with_until(Some(day(3)));
        assert!(!filter.is_unrestricted());

        assert!(!filter.in_range(&at("2024-01-01T23:59:59Z"), DayZone::Utc));
        assert!(filter.in_range(&at("2024-01-02T00:00:00Z"), DayZone::Utc));
        assert!(filter.in_range(&at("2024-01-03T23:59:59Z"), DayZone::Utc));
        assert!(!filter.in_range(&at("2024-01-04T00:00:00Z"), DayZone::Utc));
    }

    #[test]
    fn test_day_range_follows_zone() {
        let filter = FilterSpec::new().with_since(Some(DateBound::Day(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )));
        let late = at("2024-01-01T23:30:00Z");
        let plus_two = DayZone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap());

        assert!(!filter.in_range(&late, DayZone::Utc));
        assert!(filter.in_range(&late, plus_two));
    }

    #[test]
    fn test_instant_range_is_inclusive() {
        let filter = FilterSpec::new()
            .with_since(Some(DateBound::Instant(at("2024-01-02T09:00:00Z"))))
            .with_until(Some(DateBound::Instant(at("2024-01-02T10:00:00Z"))));

        assert!(!filter.in_range(&at("2024-01-02T08:59:59Z"), DayZone::Utc));
        assert!(filter.in_range(&at("2024-01-02T11:00:00+02:00"), DayZone::Utc));
        assert!(filter.in_range(&at("2024-01-02T10:00:00Z"), DayZone::Utc));
        assert!(!filter.in_range(&at("2024-01-02T10:00:01Z"), DayZone::Utc));
    }

    #[test]
    fn test_open_range_admits_everything() {
        let filter = FilterSpec::new();
        assert!(filter.in_range(&at("1970-01-01T00:00:00Z"), DayZone::Utc));
        assert!(filter.in_range(&at("2999-12-31T23:59:59Z"), DayZone::Utc));
    }

    #[test]
    fn test_builder_replaces_facet_wholesale() {
        let narrow = FilterSpec::new().with_tags(["#office"]);
        let replaced = narrow.clone().with_tags(["#prank"]);

        assert_eq!(narrow.tags().len(), 1);
        assert!(replaced.tags().contains("#prank"));
        assert!(!replaced.tags().contains("#office"));
    }
}
