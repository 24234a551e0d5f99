//! Calendar-day keys.
//!
//! A [`Daystamp`] is a date in the configured local time zone, rendered as
//! `YYYYMMDD`. It is the unique key of the SoT store and the grouping key for
//! datapoints on both feeds.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CoreError;

/// A calendar day, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Daystamp(NaiveDate);

impl Daystamp {
    const FORMAT: &'static str = "%Y%m%d";

    #[must_use]
    pub const fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// The current day in `tz`.
    #[must_use]
    pub fn today(tz: Tz) -> Self {
        Self::of_instant(Utc::now(), tz)
    }

    /// The local day in `tz` that contains `instant`.
    #[must_use]
    pub fn of_instant(instant: DateTime<Utc>, tz: Tz) -> Self {
        Self(tz.from_utc_datetime(&instant.naive_utc()).date_naive())
    }

    /// The local day in `tz` of a Unix timestamp in seconds.
    ///
    /// Returns `None` for timestamps chrono cannot represent.
    #[must_use]
    pub fn of_timestamp(secs: i64, tz: Tz) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(|instant| Self::of_instant(instant, tz))
    }

    /// The day `n` days before this one.
    #[must_use]
    pub fn minus_days(self, n: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(n)).map(Self)
    }

    /// The following day.
    #[must_use]
    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl fmt::Display for Daystamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for Daystamp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidDaystamp(s.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, Self::FORMAT)
            .map(Self)
            .map_err(|_| CoreError::InvalidDaystamp(s.to_string()))
    }
}

impl Serialize for Daystamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Daystamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an IANA zone name such as `America/New_York`.
///
/// # Errors
///
/// Returns [`CoreError::UnknownTimeZone`] if the name is not recognised.
pub fn parse_time_zone(name: &str) -> Result<Tz, CoreError> {
    name.parse::<Tz>()
        .map_err(|_| CoreError::UnknownTimeZone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    #[test]
    fn parses_and_formats_roundtrip() {
        let ds: Daystamp = "20250101".parse().unwrap();
        assert_eq!(ds.to_string(), "20250101");
        assert_eq!(ds.date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["2025011", "2025-01-01", "20251301", "abcdefgh", ""] {
            assert!(bad.parse::<Daystamp>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn timestamp_maps_to_local_day() {
        // 2025-03-01T03:00:00Z is still Feb 28 in New York.
        let ds = Daystamp::of_timestamp(1_740_798_000, New_York).unwrap();
        assert_eq!(ds.to_string(), "20250228");
    }

    #[test]
    fn ordering_is_chronological() {
        let a: Daystamp = "20241231".parse().unwrap();
        let b: Daystamp = "20250101".parse().unwrap();
        assert!(a < b);
        assert_eq!(a.succ(), Some(b));
        assert_eq!(b.minus_days(1), Some(a));
    }

    #[test]
    fn serde_uses_compact_string() {
        let ds: Daystamp = "20250704".parse().unwrap();
        let json = serde_json::to_string(&ds).unwrap();
        assert_eq!(json, "\"20250704\"");
        let back: Daystamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn unknown_zone_is_rejected() {
        assert!(parse_time_zone("America/New_York").is_ok());
        assert!(matches!(
            parse_time_zone("Mars/Olympus"),
            Err(CoreError::UnknownTimeZone(_))
        ));
    }
}
