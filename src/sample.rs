//! Built-in sample feed, for trying the tool without a feed file.

use crate::models::Entry;

const SAMPLE_FEED: &str = include_str!("../fixtures/sample_feed.json");

/// Parses the bundled sample feed.
pub fn sample_feed() -> Result<Vec<Entry>, serde_json::Error> {
    serde_json::from_str(SAMPLE_FEED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AggregateOptions, DayZone, FeedAggregator, FilterSpec};
    use crate::models::EntryKind;

    #[test]
    fn test_sample_feed_parses() {
        let entries = sample_feed().unwrap();
        assert_eq!(entries.len(), 7);
        assert!(entries.iter().all(|e| e.instant().is_ok()));
        assert_eq!(
            entries.iter().filter(|e| e.kind == EntryKind::Friend).count(),
            2
        );
    }

    #[test]
    fn test_sample_feed_office_tag() {
        let entries = sample_feed().unwrap();
        let aggregator = FeedAggregator::new(AggregateOptions {
            zone: DayZone::Utc,
            ..Default::default()
        });

        let feed = aggregator
            .aggregate(&entries, &FilterSpec::new().with_tags(["#office"]))
            .unwrap();
        let days: Vec<String> = feed.days.iter().map(|g| g.day.to_string()).collect();
        assert_eq!(days, vec!["2024-03-14", "2024-02-28"]);
    }

    #[test]
    fn test_sample_feed_jim_any_of_friends() {
        let entries = sample_feed().unwrap();
        let aggregator = FeedAggregator::new(AggregateOptions {
            zone: DayZone::Utc,
            ..Default::default()
        });

        let feed = aggregator
            .aggregate(
                &entries,
                &FilterSpec::new().with_friends(["Jim Halpert", "Pam Beesly"]),
            )
            .unwrap();
        let ids: Vec<&str> = feed.entries().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "2", "3"]);
    }
}
