//! Serde adapters for the snapshot's date fields.
//!
//! Calendar dates are written as UTC-midnight RFC 3339 timestamps so files stay
//! readable by tools expecting full timestamps. Readers accept any RFC 3339
//! timestamp (keeping the calendar date in its own offset) or a bare
//! `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serializer};

use crate::core::time::start_of_day;

const ISO_DATE: &str = "%Y-%m-%d";

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE).ok()
}

/// `NaiveDate` <-> timestamp string.
pub mod iso_date {
    use super::*;

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let stamp = start_of_day(*date).to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        serializer.serialize_str(&stamp)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO-8601 date `{raw}`")))
    }
}

/// `Option<DateTime<Utc>>` where `null` and the zero timestamp both mean absent.
pub mod optional_timestamp {
    use super::*;
    use chrono::Datelike;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(stamp) => serializer.serialize_some(&stamp.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let stamp = DateTime::parse_from_rfc3339(raw.trim())
            .map_err(|err| serde::de::Error::custom(format!("invalid timestamp `{raw}`: {err}")))?
            .with_timezone(&Utc);
        if stamp.year() <= 1 {
            return Ok(None);
        }
        Ok(Some(stamp))
    }
}
