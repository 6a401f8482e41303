//! Calendar-day resolution for feed timestamps.
//!
//! Entries are grouped by the calendar day their instant falls on in a
//! chosen zone: the machine's local zone, UTC, or a fixed offset.

use crate::error::FeedError;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Zone used to derive day keys and wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayZone {
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl DayZone {
    /// Calendar day of `instant` in this zone.
    pub fn day_of(&self, instant: &DateTime<FixedOffset>) -> NaiveDate {
        match self {
            DayZone::Local => instant.with_timezone(&Local).date_naive(),
            DayZone::Utc => instant.with_timezone(&Utc).date_naive(),
            DayZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// Wall-clock time of `instant` in this zone.
    pub fn time_of(&self, instant: &DateTime<FixedOffset>) -> NaiveTime {
        match self {
            DayZone::Local => instant.with_timezone(&Local).time(),
            DayZone::Utc => instant.with_timezone(&Utc).time(),
            DayZone::Fixed(offset) => instant.with_timezone(offset).time(),
        }
    }
}

impl fmt::Display for DayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayZone::Local => write!(f, "local"),
            DayZone::Utc => write!(f, "utc"),
            DayZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl FromStr for DayZone {
    type Err = FeedError;

    /// Accepts `local`, `utc` (or `z`), and offsets such as `+02:00`,
    /// `-0530` or `+9`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "local" => return Ok(DayZone::Local),
            "utc" | "z" => return Ok(DayZone::Utc),
            _ => {}
        }

        parse_offset(trimmed)
            .map(DayZone::Fixed)
            .ok_or_else(|| FeedError::InvalidZone(s.to_string()))
    }
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.chars().next()? {
        '+' => (1, &s[1..]),
        '-' => (-1, &s[1..]),
        _ => return None,
    };
    if !rest.is_ascii() {
        return None;
    }

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };

    if hours.is_empty() || !hours.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !minutes.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    // Checked before multiplying so oversized input cannot overflow.
    if hours > 23 || minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_parse_named_zones() {
        assert_eq!("local".parse::<DayZone>().unwrap(), DayZone::Local);
        assert_eq!("UTC".parse::<DayZone>().unwrap(), DayZone::Utc);
        assert_eq!(" z ".parse::<DayZone>().unwrap(), DayZone::Utc);
    }

    #[test]
    fn test_parse_offsets() {
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!("+02:00".parse::<DayZone>().unwrap(), DayZone::Fixed(east));
        assert_eq!("+0200".parse::<DayZone>().unwrap(), DayZone::Fixed(east));
        assert_eq!("+2".parse::<DayZone>().unwrap(), DayZone::Fixed(east));

        let west = FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap();
        assert_eq!("-05:30".parse::<DayZone>().unwrap(), DayZone::Fixed(west));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("mars".parse::<DayZone>().is_err());
        assert!("+25:00".parse::<DayZone>().is_err());
        assert!("+02:75".parse::<DayZone>().is_err());
        assert!("+".parse::<DayZone>().is_err());
        assert!("02:00".parse::<DayZone>().is_err());
    }

    #[test]
    fn test_parse_rejects_oversized_offsets() {
        assert!(matches!(
            "+999999".parse::<DayZone>(),
            Err(FeedError::InvalidZone(_))
        ));
        assert!("-99999999999".parse::<DayZone>().is_err());
        assert!("+24:00".parse::<DayZone>().is_err());
        assert!("+23:59".parse::<DayZone>().is_ok());
    }

    #[test]
    fn test_day_of_depends_on_zone() {
        let late = instant("2024-01-01T23:30:00Z");
        assert_eq!(
            DayZone::Utc.day_of(&late),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );

        let plus_two = DayZone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(
            plus_two.day_of(&late),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(
            plus_two.time_of(&late),
            NaiveTime::from_hms_opt(1, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_display_round_trips_names() {
        assert_eq!(DayZone::Utc.to_string(), "utc");
        assert_eq!(DayZone::Local.to_string(), "local");
        assert_eq!(
            DayZone::Fixed(FixedOffset::east_opt(3600).unwrap()).to_string(),
            "+01:00"
        );
    }
}
