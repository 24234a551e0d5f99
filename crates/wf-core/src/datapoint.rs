//! Goal datapoints as returned by the remote feed.
//!
//! The same shape serves both feeds: records of the source goal are the
//! session records the outcome is computed from, records of the target goal
//! are what reconciliation corrects. Every field is optional on read because
//! the remote collection may be edited by hand.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::daystamp::Daystamp;

/// A last-updated stamp, either Unix seconds or an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stamp {
    Epoch(f64),
    Text(String),
}

impl Stamp {
    /// Seconds since the Unix epoch, if the stamp is parseable.
    #[must_use]
    pub fn as_secs(&self) -> Option<f64> {
        match self {
            Self::Epoch(secs) if secs.is_finite() => Some(*secs),
            Self::Epoch(_) => None,
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|secs| secs.is_finite())
                .or_else(|| parse_iso_secs(text)),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn parse_iso_secs(text: &str) -> Option<f64> {
    let normalized = text.trim().replace('Z', "+00:00");
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|dt| dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_millis()) / 1000.0)
}

/// Every field tolerates a wrong JSON type by reading it as `None`, so one
/// hand-edited record cannot reject a whole listing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Unix seconds of the moment the datapoint applies to.
    #[serde(default, deserialize_with = "lenient_number")]
    pub timestamp: Option<f64>,
    /// Feed-native `YYYYMMDD` day, preferred over `timestamp` when present.
    #[serde(default, deserialize_with = "lenient_string")]
    pub daystamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient_stamp")]
    pub updated_at: Option<Stamp>,
    /// Client-supplied idempotency token echoed back by the remote.
    #[serde(default, deserialize_with = "lenient_string")]
    pub requestid: Option<String>,
}

impl Datapoint {
    /// The calendar day this datapoint belongs to.
    ///
    /// Uses the feed's `daystamp` when it is a valid `YYYYMMDD`, otherwise
    /// the local day of `timestamp`. `None` when neither is usable.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn day(&self, tz: Tz) -> Option<Daystamp> {
        if let Some(ds) = self.daystamp.as_deref().and_then(|s| s.parse().ok()) {
            return Some(ds);
        }
        let secs = self.timestamp.filter(|t| t.is_finite())?;
        Daystamp::of_timestamp(secs.floor() as i64, tz)
    }

    /// Sort key used to pick the newest record of a day.
    ///
    /// `updated_at` first, then the raw `timestamp`, then zero.
    #[must_use]
    pub fn recency_key(&self) -> f64 {
        self.updated_at
            .as_ref()
            .and_then(Stamp::as_secs)
            .or_else(|| self.timestamp.filter(|t| t.is_finite()))
            .unwrap_or(0.0)
    }

    /// The numeric value rounded to the nearest integer (missing reads as 0).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded_value(&self) -> i64 {
        self.value.filter(|v| v.is_finite()).map_or(0, |v| v.round() as i64)
    }

    /// The comment text, empty when absent.
    #[must_use]
    pub fn comment_text(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    /// The remote identifier, treating an empty string as missing.
    #[must_use]
    pub fn remote_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Accept a JSON number or a numeric string; anything else reads as `None`.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accept a string or a number (rendered as text); anything else is `None`.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_stamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Stamp>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().map(Stamp::Epoch),
        Some(Value::String(s)) => Some(Stamp::Text(s)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"[
        {
            "id": "64f1a2b3c4d5e6f7a8b9c0d1",
            "timestamp": 1735740000,
            "daystamp": "20250101",
            "value": 1.0,
            "comment": "Auto: SoT=1 for 20250101 (≥50m by 09:15 check).",
            "updated_at": 1735745000,
            "requestid": "wakeandfocus-20250101-sot-v1",
            "canonical": "1 1 \"whatever\"",
            "is_dummy": false
        },
        {
            "id": "64f1a2b3c4d5e6f7a8b9c0d2",
            "timestamp": 1735740000,
            "value": "0",
            "updated_at": "2025-01-01T15:00:00Z"
        },
        {}
    ]"#;

    #[test]
    fn parses_feed_payload_leniently() {
        let dps: Vec<Datapoint> = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(dps.len(), 3);

        assert_eq!(dps[0].remote_id(), Some("64f1a2b3c4d5e6f7a8b9c0d1"));
        assert_eq!(dps[0].updated_at, Some(Stamp::Epoch(1_735_745_000.0)));
        assert_eq!(dps[0].requestid.as_deref(), Some("wakeandfocus-20250101-sot-v1"));

        assert_eq!(dps[1].value, Some(0.0));
        assert_eq!(
            dps[1].updated_at,
            Some(Stamp::Text("2025-01-01T15:00:00Z".into()))
        );

        assert_eq!(dps[2], Datapoint::default());
    }

    #[test]
    fn mistyped_fields_do_not_reject_the_page() {
        let dps: Vec<Datapoint> = serde_json::from_str(
            r#"[
                {"id": "ok", "comment": "50 minutes session at 8:00"},
                {"id": 123, "timestamp": "1735740000", "daystamp": 20250101},
                {"id": null, "comment": {"nested": true}, "updated_at": [1, 2], "requestid": false},
                {"timestamp": "soon", "value": true, "updated_at": "1735745000"}
            ]"#,
        )
        .unwrap();
        assert_eq!(dps.len(), 4);

        assert_eq!(dps[0].remote_id(), Some("ok"));

        assert_eq!(dps[1].remote_id(), Some("123"));
        assert_eq!(dps[1].timestamp, Some(1_735_740_000.0));
        assert_eq!(dps[1].day(New_York).unwrap().to_string(), "20250101");

        assert_eq!(dps[2].remote_id(), None);
        assert_eq!(dps[2].comment, None);
        assert_eq!(dps[2].updated_at, None);
        assert_eq!(dps[2].requestid, None);

        assert_eq!(dps[3].timestamp, None);
        assert_eq!(dps[3].value, None);
        assert_eq!(dps[3].updated_at, Some(Stamp::Text("1735745000".into())));
        assert_eq!(dps[3].recency_key(), 1_735_745_000.0);
    }

    #[test]
    fn day_prefers_daystamp_then_timestamp() {
        let with_daystamp = Datapoint {
            daystamp: Some("20250102".into()),
            timestamp: Some(1_735_740_000.0),
            ..Datapoint::default()
        };
        assert_eq!(with_daystamp.day(New_York).unwrap().to_string(), "20250102");

        let only_timestamp = Datapoint {
            timestamp: Some(1_735_740_000.0),
            ..Datapoint::default()
        };
        assert_eq!(only_timestamp.day(New_York).unwrap().to_string(), "20250101");

        let garbage_daystamp = Datapoint {
            daystamp: Some("yesterday".into()),
            ..Datapoint::default()
        };
        assert!(garbage_daystamp.day(New_York).is_none());
    }

    #[test]
    fn recency_falls_back_through_updated_at_timestamp_zero() {
        let iso = Datapoint {
            updated_at: Some(Stamp::Text("2025-01-01T15:00:00Z".into())),
            timestamp: Some(1.0),
            ..Datapoint::default()
        };
        assert_eq!(iso.recency_key(), 1_735_743_600.0);

        let unparseable = Datapoint {
            updated_at: Some(Stamp::Text("last tuesday".into())),
            timestamp: Some(42.0),
            ..Datapoint::default()
        };
        assert_eq!(unparseable.recency_key(), 42.0);

        assert_eq!(Datapoint::default().recency_key(), 0.0);
    }

    #[test]
    fn rounded_value_and_missing_fields() {
        let dp = Datapoint {
            value: Some(0.6),
            ..Datapoint::default()
        };
        assert_eq!(dp.rounded_value(), 1);
        assert_eq!(Datapoint::default().rounded_value(), 0);
        assert_eq!(Datapoint::default().comment_text(), "");

        let empty_id = Datapoint {
            id: Some(String::new()),
            ..Datapoint::default()
        };
        assert!(empty_id.remote_id().is_none());
    }
}
