//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::{DateBound, DayZone, FilterSpec, ScopeKind};
use crate::config::Config;
use crate::directory::Facet;
use crate::models::{EntryKind, InvalidTimestampPolicy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Frens - a timeline of friends, activities and notes
///
/// Reads a JSON feed and prints it grouped by day, filtered by friends,
/// tags, locations and kind.
///
/// Examples:
///   frens feed --sample
///   frens feed --input frens.json --tag office --scope activities
///   frens feed --sample --friend "Jim Halpert" --format json
///   frens feed --sample --since 2024-03-01 --until 2024-03-13
///   frens search --sample jell-o
///   frens stats --sample --top 3
///   frens capture --kind activity --friend "Pam Beesly" --tag art "Gallery opening"
///   frens capture "Lunch #office @Scranton"
///   frens suggest friends --sample jim
///   frens init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .frens.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Write output to this file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Zone used for day grouping: local, utc, or an offset like +02:00
    #[arg(long, value_name = "ZONE", global = true, env = "FRENS_TIMEZONE")]
    pub timezone: Option<String>,

    /// What to do with entries whose timestamp cannot be parsed
    #[arg(long, value_name = "POLICY", global = true)]
    pub on_invalid_timestamp: Option<InvalidTimestampPolicy>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the feed grouped by day, most recent first
    Feed {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Find entries whose description or tags contain a text
    Search {
        /// Text to look for (case-insensitive); empty lists every entry
        #[arg(default_value = "")]
        query: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Summarize counts, top friends/tags/locations and a monthly timeline
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        /// Items per ranking (overrides [stats] top_n)
        #[arg(long, value_name = "COUNT")]
        top: Option<usize>,

        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Build a new entry and print it as JSON
    Capture {
        /// Entry kind
        #[arg(short, long, default_value = "note")]
        kind: EntryKind,

        /// Friend involved (repeatable)
        #[arg(long = "friend", value_name = "NAME")]
        friends: Vec<String>,

        /// Tag, with or without leading # (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Location, with or without leading @ (repeatable)
        #[arg(long = "location", value_name = "PLACE")]
        locations: Vec<String>,

        /// Description, or the friend's name for --kind friend. Inline
        /// #tag and @location markers become references.
        text: Vec<String>,
    },

    /// Autocomplete a friend, tag or location
    Suggest {
        /// Which catalog to search
        facet: Facet,

        /// Partial name
        query: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Maximum number of suggestions
        #[arg(long, default_value = "10", value_name = "COUNT")]
        limit: usize,
    },

    /// Generate a default .frens.toml configuration file
    InitConfig,
}

/// Where entries come from.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// JSON feed file (defaults to [general] input)
    #[arg(short, long, value_name = "FILE", conflicts_with = "sample")]
    pub input: Option<PathBuf>,

    /// Use the built-in sample feed
    #[arg(long)]
    pub sample: bool,
}

/// Facet and scope restrictions for `feed`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only entries with this friend (repeatable; any of them matches)
    #[arg(long = "friend", value_name = "NAME")]
    pub friends: Vec<String>,

    /// Only entries with this tag (repeatable; any of them matches)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Only entries at this location (repeatable; any of them matches)
    #[arg(long = "location", value_name = "PLACE")]
    pub locations: Vec<String>,

    /// Restrict by kind
    #[arg(long, default_value = "all")]
    pub scope: ScopeKind,

    /// Only entries on or after this day (YYYY-MM-DD) or instant (RFC 3339)
    #[arg(long, visible_alias = "from", value_name = "DATE")]
    pub since: Option<DateBound>,

    /// Only entries on or before this day (YYYY-MM-DD) or instant (RFC 3339)
    #[arg(long, visible_alias = "to", value_name = "DATE")]
    pub until: Option<DateBound>,
}

impl FilterArgs {
    /// Builds the filter, adding `#`/`@` prefixes where they were omitted.
    pub fn to_filter(&self) -> FilterSpec {
        FilterSpec::new()
            .with_friends(self.friends.iter().filter_map(|f| Facet::Friends.normalize(f)))
            .with_tags(self.tags.iter().filter_map(|t| Facet::Tags.normalize(t)))
            .with_locations(
                self.locations
                    .iter()
                    .filter_map(|l| Facet::Locations.normalize(l)),
            )
            .with_scope(self.scope)
            .with_since(self.since)
            .with_until(self.until)
    }
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref zone) = self.timezone {
            zone.parse::<DayZone>().map_err(|e| e.to_string())?;
        }

        match &self.command {
            Command::Stats { top: Some(0), .. } => {
                return Err("--top must be at least 1".to_string());
            }
            Command::Suggest { limit: 0, .. } => {
                return Err("--limit must be at least 1".to_string());
            }
            Command::Feed { filter, .. } => {
                if let (Some(since), Some(until)) = (filter.since, filter.until) {
                    let inverted = match (since, until) {
                        (DateBound::Day(a), DateBound::Day(b)) => a > b,
                        (DateBound::Instant(a), DateBound::Instant(b)) => a > b,
                        _ => false,
                    };
                    if inverted {
                        return Err(format!("--since {} is after --until {}", since, until));
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over everything; `--verbose` or `[general] verbose`
    /// turn on debug output.
    pub fn log_level(&self, config: &Config) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
