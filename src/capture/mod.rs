//! Quick capture of new feed entries.
//!
//! A `CaptureDraft` holds unsubmitted input. Building it produces a new
//! `Entry` with a fresh id and the capture instant.

mod markers;

use crate::directory::Facet;
use crate::error::FeedError;
use crate::models::{Entry, EntryKind};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

/// Name used for a friend captured with an empty description.
pub const DEFAULT_FRIEND_NAME: &str = "New Friend";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureDraft {
    pub kind: EntryKind,
    pub description: String,
    pub friends: Vec<String>,
    pub tags: Vec<String>,
    pub locations: Vec<String>,
}

impl CaptureDraft {
    pub fn new(kind: EntryKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            ..Self::default()
        }
    }

    /// Whether the draft holds anything worth saving.
    pub fn can_submit(&self) -> bool {
        !self.description.trim().is_empty()
            || self.friends.iter().any(|f| !f.trim().is_empty())
            || self.tags.iter().any(|t| Facet::Tags.normalize(t).is_some())
            || self.locations.iter().any(|l| Facet::Locations.normalize(l).is_some())
    }

    /// Builds the entry captured at `now`.
    ///
    /// Friend drafts keep only the name (falling back to
    /// `DEFAULT_FRIEND_NAME`). Other kinds move inline `#tag` and
    /// `@location` markers out of the text into their references, after
    /// the explicitly given ones, and keep normalized, de-duplicated
    /// references.
    ///
    /// # Errors
    /// Returns `FeedError::EmptyDraft` when `can_submit` is false.
    pub fn build(&self, now: DateTime<Utc>) -> Result<Entry, FeedError> {
        if !self.can_submit() {
            return Err(FeedError::EmptyDraft);
        }

        let id = Uuid::new_v4().to_string();
        let created_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let description = self.description.trim();

        let entry = match self.kind {
            EntryKind::Friend => {
                let name = if description.is_empty() {
                    DEFAULT_FRIEND_NAME
                } else {
                    description
                };
                Entry::new(id, EntryKind::Friend, name, created_at)
            }
            kind => {
                let mut tags = self.tags.clone();
                tags.extend(markers::tags(description));
                let mut locations = self.locations.clone();
                locations.extend(markers::locations(description));

                Entry::new(id, kind, markers::strip(description), created_at)
                    .with_friends(dedupe(Facet::Friends, &self.friends))
                    .with_tags(dedupe(Facet::Tags, &tags))
                    .with_locations(dedupe(Facet::Locations, &locations))
            }
        };

        debug!("Captured {} entry {}", entry.kind, entry.id);
        Ok(entry)
    }
}

/// Puts a freshly captured entry at the front of the collection.
#[allow(dead_code)] // For callers that keep the feed in memory between captures
pub fn prepend(entries: &mut Vec<Entry>, entry: Entry) {
    entries.insert(0, entry);
}

fn dedupe(facet: Facet, values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if let Some(normalized) = facet.normalize(value) {
            if !out.contains(&normalized) {
                out.push(normalized);
            }
        }
    }
    out
}
