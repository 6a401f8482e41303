//! Domain errors for feed aggregation and capture.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("entry `{id}` has an invalid timestamp `{value}`: {source}")]
    InvalidTimestamp {
        id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unrecognized timezone `{0}`; expected `local`, `utc`, or an offset like `+02:00`")]
    InvalidZone(String),

    #[error("unrecognized date `{0}`; expected `YYYY-MM-DD` or an RFC 3339 timestamp")]
    InvalidDate(String),

    #[error("nothing to capture: description, friends, tags and locations are all empty")]
    EmptyDraft,
}
