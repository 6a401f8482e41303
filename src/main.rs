//! Frens - a day-grouped timeline of friends, activities and notes
//!
//! Reads a JSON feed, filters it by friends, tags, locations and kind,
//! and prints it grouped by calendar day, most recent first.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable feed, bad config, invalid timestamp
//!       under --on-invalid-timestamp fail, etc.)

mod analysis;
mod capture;
mod cli;
mod config;
mod directory;
mod error;
mod models;
mod report;
mod sample;

use analysis::{FeedAggregator, FeedStats};
use anyhow::{Context, Result};
use capture::CaptureDraft;
use chrono::Utc;
use cli::{Args, Command, OutputFormat, SourceArgs};
use config::Config;
use directory::EntityDirectory;
use models::Entry;
use report::FeedReport;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Config is read before logging so `[general] verbose` can pick the level
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config)?;

    info!("Frens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    config.merge_with_args(&args);

    if let Err(e) = run(&args, &config) {
        error!("Command failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .frens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(".frens.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .frens.toml")?;

    println!("Created .frens.toml with default settings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so that stdout stays clean for the rendered output.
/// `RUST_LOG` takes precedence over the verbosity flags when set.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level(config).to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Dispatch the parsed subcommand.
fn run(args: &Args, config: &Config) -> Result<()> {
    let output = args.output.as_deref();

    match &args.command {
        Command::Feed {
            source,
            filter,
            format,
        } => {
            let entries = load_entries(source, config)?;
            let options = config.aggregate_options()?;
            let filter = filter.to_filter();

            let feed = FeedAggregator::new(options).aggregate(&entries, &filter)?;
            if !feed.skipped.is_empty() {
                warn!(
                    "{} entries skipped for invalid timestamps",
                    feed.skipped.len()
                );
            }
            info!(
                "Showing {} of {} entries across {} days",
                feed.entry_count(),
                entries.len(),
                feed.days.len()
            );

            let report = FeedReport {
                filter: &filter,
                total_entries: entries.len(),
                zone: options.zone,
                feed: &feed,
            };
            let content = match format {
                OutputFormat::Markdown => report::generate_markdown_report(&report),
                OutputFormat::Json => report::generate_json(&report)?,
            };
            emit(&content, output)
        }

        Command::Search {
            query,
            source,
            format,
        } => {
            let entries = load_entries(source, config)?;
            let hits = analysis::search(&entries, query);
            info!("{} entries match {:?}", hits.len(), query);

            let content = match format {
                OutputFormat::Markdown => {
                    report::generate_search_markdown(query, &hits, config.zone()?)
                }
                OutputFormat::Json => report::generate_json(&hits)?,
            };
            emit(&content, output)
        }

        Command::Stats { source, format, .. } => {
            let entries = load_entries(source, config)?;
            let zone = config.zone()?;
            let stats = FeedStats::from_entries(&entries, zone, config.stats.top_n);

            let content = match format {
                OutputFormat::Markdown => report::generate_stats_markdown(&stats, zone),
                OutputFormat::Json => report::generate_json(&stats)?,
            };
            emit(&content, output)
        }

        Command::Capture {
            kind,
            friends,
            tags,
            locations,
            text,
        } => {
            let mut draft = CaptureDraft::new(*kind, text.join(" "));
            draft.friends = friends.clone();
            draft.tags = tags.clone();
            draft.locations = locations.clone();
            let entry = draft.build(Utc::now())?;
            info!("Captured {} {}", entry.kind, entry.id);

            emit(&report::generate_json(&entry)?, output)
        }

        Command::Suggest {
            facet,
            query,
            source,
            limit,
        } => {
            let mut directory = EntityDirectory::from_config(&config.directory);
            match load_entries(source, config) {
                Ok(entries) => directory.harvest(&entries),
                // The configured seed lists are still useful without a feed.
                Err(e) if source.input.is_none() && !source.sample => {
                    debug!("No feed for suggestions: {:#}", e);
                }
                Err(e) => return Err(e),
            }

            let suggestions = directory.suggest(*facet, query, *limit);
            debug!("{} {} suggestions for {:?}", suggestions.len(), facet, query);
            let mut content = suggestions.join("\n");
            content.push('\n');
            emit(&content, output)
        }

        Command::InitConfig => handle_init_config(),
    }
}

/// Print `content`, or write it to `output` when given.
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            report::write_output(content, path)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output saved to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Where the active configuration came from, reported once logging is up.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    Unreadable(anyhow::Error),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => {
                info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE)
            }
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Unreadable(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` must load; a broken default file only warns.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigOrigin::DefaultFile),
        Ok(None) => (Config::default(), ConfigOrigin::Defaults),
        Err(e) => (Config::default(), ConfigOrigin::Unreadable(e)),
    })
}

/// Read entries from the sample feed, `--input`, or `[general] input`.
fn load_entries(source: &SourceArgs, config: &Config) -> Result<Vec<Entry>> {
    if source.sample {
        debug!("Using built-in sample feed");
        return sample::sample_feed().context("Failed to parse built-in sample feed");
    }

    let path = source
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.general.input));

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read feed file: {}", path.display()))?;
    let entries: Vec<Entry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse feed file: {}", path.display()))?;

    info!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}
