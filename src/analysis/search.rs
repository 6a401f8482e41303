//! Naive text search over the feed.

use crate::models::Entry;

/// Entries whose description or any tag contains `query`, case-insensitively.
///
/// A blank query matches every entry. Input order is preserved.
pub fn search<'a>(entries: &'a [Entry], query: &str) -> Vec<&'a Entry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.iter().collect();
    }

    entries
        .iter()
        .filter(|e| {
            e.description.to_lowercase().contains(&needle)
                || e.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .collect()
}
