//! Catalog of known friends, tags and locations.
//!
//! The directory supplies autocomplete candidates for capture and filter
//! inputs. Identifiers stay opaque strings: an entry may reference a name
//! the directory has never seen.

use crate::config::DirectoryConfig;
use crate::models::{Entry, EntryKind};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// One filterable dimension of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Facet {
    Friends,
    Tags,
    Locations,
}

impl Facet {
    /// Conventional prefix for identifiers of this facet, if any.
    pub fn prefix(&self) -> Option<char> {
        match self {
            Facet::Friends => None,
            Facet::Tags => Some('#'),
            Facet::Locations => Some('@'),
        }
    }

    /// Trims `raw` and adds the facet prefix when it is missing.
    ///
    /// Returns `None` for input that is blank after trimming.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        let bare = match self.prefix() {
            Some(p) => trimmed.trim_start_matches(p).trim(),
            None => trimmed,
        };
        if bare.is_empty() {
            return None;
        }

        Some(match self.prefix() {
            Some(p) => format!("{}{}", p, bare),
            None => bare.to_string(),
        })
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facet::Friends => write!(f, "friends"),
            Facet::Tags => write!(f, "tags"),
            Facet::Locations => write!(f, "locations"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityDirectory {
    friends: BTreeSet<String>,
    tags: BTreeSet<String>,
    locations: BTreeSet<String>,
}

impl EntityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the directory from the `[directory]` config section.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        let mut directory = Self::new();
        for name in &config.friends {
            directory.insert(Facet::Friends, name);
        }
        for name in &config.tags {
            directory.insert(Facet::Tags, name);
        }
        for name in &config.locations {
            directory.insert(Facet::Locations, name);
        }
        directory
    }

    /// Adds `name` to the catalog of `facet`, normalized.
    ///
    /// Returns true when the name was not known yet.
    pub fn insert(&mut self, facet: Facet, name: &str) -> bool {
        match facet.normalize(name) {
            Some(normalized) => self.catalog_mut(facet).insert(normalized),
            None => false,
        }
    }

    /// Learns every identifier referenced by `entries`.
    ///
    /// Friend entries contribute their description as a friend name.
    pub fn harvest(&mut self, entries: &[Entry]) {
        let mut added = 0;
        for entry in entries {
            if entry.kind == EntryKind::Friend && self.insert(Facet::Friends, &entry.description) {
                added += 1;
            }
            for name in &entry.friends {
                added += usize::from(self.insert(Facet::Friends, name));
            }
            for name in &entry.tags {
                added += usize::from(self.insert(Facet::Tags, name));
            }
            for name in &entry.locations {
                added += usize::from(self.insert(Facet::Locations, name));
            }
        }
        debug!("Directory learned {} names from {} entries", added, entries.len());
    }

    pub fn catalog(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Friends => &self.friends,
            Facet::Tags => &self.tags,
            Facet::Locations => &self.locations,
        }
    }

    fn catalog_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Friends => &mut self.friends,
            Facet::Tags => &mut self.tags,
            Facet::Locations => &mut self.locations,
        }
    }

    /// Autocomplete candidates for `query` within one facet.
    ///
    /// Case-insensitive substring match; prefix matches come first, then
    /// alphabetical order. The facet prefix in `query` (`#`, `@`) is optional.
    pub fn suggest(&self, facet: Facet, query: &str, limit: usize) -> Vec<&str> {
        let needle = match facet.prefix() {
            Some(p) => query.trim().trim_start_matches(p),
            None => query.trim(),
        }
        .to_lowercase();

        let mut matches: Vec<(bool, &str)> = self
            .catalog(facet)
            .iter()
            .filter_map(|name| {
                let bare = match facet.prefix() {
                    Some(p) => name.trim_start_matches(p),
                    None => name.as_str(),
                }
                .to_lowercase();
                if bare.contains(&needle) {
                    Some((!bare.starts_with(&needle), name.as_str()))
                } else {
                    None
                }
            })
            .collect();

        // Catalog iteration is already alphabetical; a stable sort on the
        // prefix flag keeps that order within each bucket.
        matches.sort_by_key(|(not_prefix, _)| *not_prefix);
        matches.truncate(limit);
        matches.into_iter().map(|(_, name)| name).collect()
    }
}
