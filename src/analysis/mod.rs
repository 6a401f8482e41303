//! Feed analysis modules.
//!
//! Filtering, day grouping, search and statistics over in-memory entries.
//! Everything here is synchronous and side-effect free apart from logging.

pub mod aggregator;
pub mod filter;
pub mod search;
pub mod stats;
pub mod zone;

pub use aggregator::{AggregateOptions, FeedAggregator};
pub use filter::{DateBound, FilterSpec, ScopeKind};
pub use search::search;
pub use stats::FeedStats;
pub use zone::DayZone;
