//! Markdown and JSON output.
//!
//! This module turns an aggregated feed, search hits or feed statistics
//! into text for the terminal or a file.

use crate::analysis::stats::{FeedStats, RankedItem};
use crate::analysis::{DayZone, FilterSpec};
use crate::models::{Entry, Feed};
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// An aggregated feed together with the context needed to describe it.
#[derive(Debug, Clone, Serialize)]
pub struct FeedReport<'a> {
    pub filter: &'a FilterSpec,
    /// Number of entries before filtering.
    pub total_entries: usize,
    #[serde(skip)]
    pub zone: DayZone,
    #[serde(flatten)]
    pub feed: &'a Feed,
}

/// Generate the Markdown timeline.
pub fn generate_markdown_report(report: &FeedReport<'_>) -> String {
    let mut output = String::new();

    output.push_str("# Frens\n\n");
    output.push_str(&generate_filter_line(report.filter));

    if report.feed.is_empty() {
        output.push_str(empty_feed_message(report.total_entries));
        output.push_str("\n\n");
    } else {
        output.push_str(&format!(
            "*{} of {} entries*\n\n",
            report.feed.entry_count(),
            report.total_entries
        ));
        for group in &report.feed.days {
            output.push_str(&format!("## {}\n\n", group.day.format("%Y-%m-%d")));
            for entry in &group.entries {
                output.push_str(&generate_entry_line(entry, report.zone));
            }
            output.push('\n');
        }
    }

    if !report.feed.skipped.is_empty() {
        output.push_str("## Skipped\n\n");
        for skipped in &report.feed.skipped {
            output.push_str(&format!(
                "- `{}`: invalid timestamp `{}` ({})\n",
                skipped.id, skipped.created_at, skipped.reason
            ));
        }
        output.push('\n');
    }

    output
}

/// Distinguishes an empty source from a fully filtered-out one.
fn empty_feed_message(total_entries: usize) -> &'static str {
    if total_entries == 0 {
        "No entries yet. Start by capturing something."
    } else {
        "No entries match the current filters."
    }
}

/// One-line description of the active filter.
fn generate_filter_line(filter: &FilterSpec) -> String {
    if filter.is_unrestricted() {
        return "*Filter: none*\n\n".to_string();
    }

    let mut parts = Vec::new();
    if !filter.friends().is_empty() {
        parts.push(format!("friends {}", join(filter.friends())));
    }
    if !filter.tags().is_empty() {
        parts.push(format!("tags {}", join(filter.tags())));
    }
    if !filter.locations().is_empty() {
        parts.push(format!("locations {}", join(filter.locations())));
    }
    parts.push(format!("scope {}", filter.scope()));
    if let Some(since) = filter.since() {
        parts.push(format!("since {}", since));
    }
    if let Some(until) = filter.until() {
        parts.push(format!("until {}", until));
    }

    format!("*Filter: {}*\n\n", parts.join("; "))
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Generate a single entry bullet.
fn generate_entry_line(entry: &Entry, zone: DayZone) -> String {
    let time = entry
        .instant()
        .map(|at| zone.time_of(&at).format("%H:%M").to_string())
        .unwrap_or_else(|_| "--:--".to_string());

    let mut line = format!(
        "- {} **{}** {}",
        entry.kind.emoji(),
        entry.kind.to_string().to_uppercase(),
        time
    );

    if !entry.description.is_empty() {
        line.push_str(&format!(" {}", entry.description));
    }

    let badges: Vec<String> = entry
        .friends
        .iter()
        .chain(entry.tags.iter())
        .chain(entry.locations.iter())
        .map(|b| format!("`{}`", b))
        .collect();
    if !badges.is_empty() {
        line.push_str(&format!(" {}", badges.join(" ")));
    }

    line.push('\n');
    line
}

/// Generate the Markdown list of search hits.
pub fn generate_search_markdown(query: &str, hits: &[&Entry], zone: DayZone) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Search: {}\n\n", query));
    if hits.is_empty() {
        output.push_str("No matches.\n");
        return output;
    }

    output.push_str(&format!("*{} matches*\n\n", hits.len()));
    for entry in hits {
        let day = entry
            .instant()
            .map(|at| zone.day_of(&at).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| "????-??-??".to_string());
        output.push_str(&format!("{} {}", day, generate_entry_line(entry, zone)));
    }

    output
}

/// Generate the Markdown statistics summary, with dates taken in `zone`.
pub fn generate_stats_markdown(stats: &FeedStats, zone: DayZone) -> String {
    let mut section = String::new();

    section.push_str("# Frens Stats\n\n");

    section.push_str("| Friends | Locations | Activities | Notes |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        stats.counts.friends, stats.counts.locations, stats.counts.activities, stats.counts.notes
    ));

    section.push_str(&generate_ranking_section("Top Friends", &stats.top_friends, zone));
    section.push_str(&generate_ranking_section("Top Tags", &stats.top_tags, zone));
    section.push_str(&generate_ranking_section(
        "Top Locations",
        &stats.top_locations,
        zone,
    ));

    if !stats.timeline.is_empty() {
        section.push_str("## Timeline\n\n");
        section.push_str("| Month | Activities | Notes |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for point in &stats.timeline {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                point.month, point.activities, point.notes
            ));
        }
        section.push('\n');
    }

    section
}

fn generate_ranking_section(title: &str, items: &[RankedItem], zone: DayZone) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str(&format!("## {}\n\n", title));
    section.push_str("| Name | Entries | Last Activity |\n");
    section.push_str("|:---|:---:|:---|\n");
    for item in items {
        let last = item
            .last_activity
            .map(|at| zone.day_of(&at).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        section.push_str(&format!("| {} | {} | {} |\n", item.name, item.count, last));
    }
    section.push('\n');
    section
}

/// Generate a pretty-printed JSON document for any serializable output.
pub fn generate_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// Write rendered output to a file.
pub fn write_output(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FeedAggregator, ScopeKind};
    use crate::models::{EntryKind, SkippedEntry};

    fn entries() -> Vec<Entry> {
        vec![
            Entry::new("1", EntryKind::Activity, "Hosted Diversity Day", "2024-01-02T10:00:00Z")
                .with_friends(["Michael Scott"])
                .with_tags(["#office"])
                .with_locations(["@Scranton"]),
            Entry::new("2", EntryKind::Note, "Jell-O stapler", "2024-01-02T09:00:00Z"),
            Entry::new("3", EntryKind::Friend, "Dwight Schrute", "2024-01-01T08:00:00Z"),
        ]
    }

    fn aggregate(entries: &[Entry], filter: &FilterSpec) -> Feed {
        FeedAggregator::new(crate::analysis::AggregateOptions {
            zone: DayZone::Utc,
            ..Default::default()
        })
        .aggregate(entries, filter)
        .unwrap()
    }

    #[test]
    fn test_markdown_lists_days_in_order() {
        let entries = entries();
        let filter = FilterSpec::new();
        let feed = aggregate(&entries, &filter);
        let report = FeedReport {
            filter: &filter,
            total_entries: entries.len(),
            zone: DayZone::Utc,
            feed: &feed,
        };

        let md = generate_markdown_report(&report);
        let first = md.find("## 2024-01-02").unwrap();
        let second = md.find("## 2024-01-01").unwrap();
        assert!(first < second);
        assert!(md.contains("**ACTIVITY** 10:00 Hosted Diversity Day"));
        assert!(md.contains("`Michael Scott` `#office` `@Scranton`"));
        assert!(md.contains("**FRIEND** 08:00 Dwight Schrute"));
        assert!(md.contains("*Filter: none*"));
    }

    #[test]
    fn test_markdown_distinguishes_empty_reasons() {
        let filter = FilterSpec::new().with_tags(["#wedding"]);
        let empty = Feed::default();

        let no_source = generate_markdown_report(&FeedReport {
            filter: &filter,
            total_entries: 0,
            zone: DayZone::Utc,
            feed: &empty,
        });
        assert!(no_source.contains("No entries yet"));

        let filtered = generate_markdown_report(&FeedReport {
            filter: &filter,
            total_entries: 3,
            zone: DayZone::Utc,
            feed: &empty,
        });
        assert!(filtered.contains("No entries match the current filters"));
        assert!(filtered.contains("tags #wedding"));
    }

    #[test]
    fn test_markdown_lists_skipped_entries() {
        let feed = Feed {
            days: Vec::new(),
            skipped: vec![SkippedEntry {
                id: "bad".to_string(),
                created_at: "soon".to_string(),
                reason: "input contains invalid characters".to_string(),
            }],
        };
        let filter = FilterSpec::new();
        let md = generate_markdown_report(&FeedReport {
            filter: &filter,
            total_entries: 1,
            zone: DayZone::Utc,
            feed: &feed,
        });

        assert!(md.contains("## Skipped"));
        assert!(md.contains("`bad`"));
    }

    #[test]
    fn test_filter_line_names_every_facet() {
        let filter = FilterSpec::new()
            .with_friends(["Jim Halpert", "Pam Beesly"])
            .with_locations(["@Scranton"])
            .with_scope(ScopeKind::ActivitiesOnly);

        let line = generate_filter_line(&filter);
        assert!(line.contains("friends Jim Halpert | Pam Beesly"));
        assert!(line.contains("locations @Scranton"));
        assert!(line.contains("scope activities only"));

        let ranged = FilterSpec::new()
            .with_since(Some("2024-01-01".parse().unwrap()))
            .with_until(Some("2024-01-31".parse().unwrap()));
        let line = generate_filter_line(&ranged);
        assert!(line.contains("since 2024-01-01; until 2024-01-31"));
    }

    #[test]
    fn test_search_markdown() {
        let entries = entries();
        let hits: Vec<&Entry> = entries.iter().filter(|e| e.id == "2").collect();

        let md = generate_search_markdown("jell", &hits, DayZone::Utc);
        assert!(md.contains("# Search: jell"));
        assert!(md.contains("2024-01-02 - 📝 **NOTE** 09:00 Jell-O stapler"));

        let none = generate_search_markdown("zzz", &[], DayZone::Utc);
        assert!(none.contains("No matches."));
    }

    #[test]
    fn test_stats_markdown() {
        let stats = FeedStats::from_entries(&entries(), DayZone::Utc, 5);
        let md = generate_stats_markdown(&stats, DayZone::Utc);

        assert!(md.contains("| 2 | 1 | 1 | 1 |"));
        assert!(md.contains("## Top Friends"));
        assert!(md.contains("| Michael Scott | 1 | 2024-01-02 |"));
        assert!(md.contains("| 2024-01 | 1 | 1 |"));
    }

    #[test]
    fn test_stats_markdown_dates_follow_zone() {
        let entries = vec![Entry::new(
            "1",
            EntryKind::Activity,
            "Late shift",
            "2024-01-01T23:30:00Z",
        )
        .with_friends(["Creed Bratton"])];
        let plus_two = DayZone::Fixed(chrono::FixedOffset::east_opt(2 * 3600).unwrap());

        let stats = FeedStats::from_entries(&entries, plus_two, 5);
        let md = generate_stats_markdown(&stats, plus_two);
        assert!(md.contains("| Creed Bratton | 1 | 2024-01-02 |"));
        assert!(md.contains("| 2024-01 | 1 | 0 |"));

        let md = generate_stats_markdown(&stats, DayZone::Utc);
        assert!(md.contains("| Creed Bratton | 1 | 2024-01-01 |"));
    }

    #[test]
    fn test_generate_json_report() {
        let entries = entries();
        let filter = FilterSpec::new().with_scope(ScopeKind::NotesOnly);
        let feed = aggregate(&entries, &filter);
        let report = FeedReport {
            filter: &filter,
            total_entries: entries.len(),
            zone: DayZone::Utc,
            feed: &feed,
        };

        let json = generate_json(&report).unwrap();
        assert!(json.contains("\"days\""));
        assert!(json.contains("\"day\": \"2024-01-02\""));
        assert!(json.contains("\"scope\": \"notes_only\""));
        assert!(json.contains("\"total_entries\": 3"));
        assert!(!json.contains("\"skipped\""));
    }

    #[test]
    fn test_write_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.md");
        write_output("# Frens\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Frens\n");
    }
}
