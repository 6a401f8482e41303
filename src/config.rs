//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.frens.toml` files.

use crate::analysis::{AggregateOptions, DayZone};
use crate::models::InvalidTimestampPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".frens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Feed aggregation settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Known friends, tags and locations.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Statistics settings.
    #[serde(default)]
    pub stats: StatsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Feed file read when no `--input` is given.
    #[serde(default = "default_input")]
    pub input: String,

    /// Log at debug level unless `--quiet` is given.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            verbose: false,
        }
    }
}

fn default_input() -> String {
    "frens.json".to_string()
}

/// Feed aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Zone for day grouping: `local`, `utc`, or an offset like `+02:00`.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// `skip` or `fail`.
    #[serde(default)]
    pub on_invalid_timestamp: InvalidTimestampPolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            on_invalid_timestamp: InvalidTimestampPolicy::default(),
        }
    }
}

fn default_timezone() -> String {
    "local".to_string()
}

/// Seed catalogs for autocomplete. Entries in the loaded feed are added
/// on top of these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub friends: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub locations: Vec<String>,
}

/// Statistics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Items kept per ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.frens.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref timezone) = args.timezone {
            self.feed.timezone = timezone.clone();
        }

        if let Some(policy) = args.on_invalid_timestamp {
            self.feed.on_invalid_timestamp = policy;
        }

        if let crate::cli::Command::Stats { top: Some(top), .. } = args.command {
            self.stats.top_n = top;
        }
    }

    /// Resolves the configured zone.
    pub fn zone(&self) -> Result<DayZone> {
        self.feed
            .timezone
            .parse()
            .with_context(|| format!("Invalid [feed] timezone: {}", self.feed.timezone))
    }

    /// Aggregation options derived from the `[feed]` section.
    pub fn aggregate_options(&self) -> Result<AggregateOptions> {
        Ok(AggregateOptions {
            zone: self.zone()?,
            on_invalid_timestamp: self.feed.on_invalid_timestamp,
        })
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
