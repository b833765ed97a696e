//! Lenient decoding of values posted by the admin console.
//!
//! The console sends ids as either JSON numbers or numeric strings, and
//! boolean flags as `true`/`false` or `1`/`0`. These helpers accept both and
//! leave range checks to the domain layer.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{Date, DbId, Timestamp};

/// An id as received on the wire, before coercion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LooseId {
    Int(i64),
    Text(String),
}

impl LooseId {
    /// Coerce to a positive id. `field` names the input in the error message.
    pub fn to_positive_id(&self, field: &str) -> Result<DbId, CoreError> {
        let value = match self {
            LooseId::Int(v) => Some(*v),
            LooseId::Text(s) => s.trim().parse::<i64>().ok(),
        };
        match value {
            Some(v) if v > 0 => Ok(v),
            _ => Err(CoreError::Validation(format!(
                "{field} must be a positive integer"
            ))),
        }
    }
}

impl From<DbId> for LooseId {
    fn from(value: DbId) -> Self {
        LooseId::Int(value)
    }
}

/// Coerce a required id field, reporting a missing value by name.
pub fn require_id(value: Option<&LooseId>, field: &str) -> Result<DbId, CoreError> {
    value
        .ok_or_else(|| CoreError::Validation(format!("{field} is required")))?
        .to_positive_id(field)
}

/// Coerce an optional id field. Absent, `null`, empty string and `0` all mean "none".
pub fn optional_id(value: Option<&LooseId>, field: &str) -> Result<Option<DbId>, CoreError> {
    match value {
        None => Ok(None),
        Some(LooseId::Int(0)) => Ok(None),
        Some(LooseId::Text(s)) if s.trim().is_empty() || s.trim() == "0" => Ok(None),
        Some(id) => id.to_positive_id(field).map(Some),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl RawFlag {
    fn into_bool<E: serde::de::Error>(self) -> Result<bool, E> {
        match self {
            RawFlag::Bool(b) => Ok(b),
            RawFlag::Int(0) => Ok(false),
            RawFlag::Int(1) => Ok(true),
            RawFlag::Int(other) => Err(E::custom(format!("invalid flag value {other}"))),
            RawFlag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => Ok(true),
                "0" | "false" => Ok(false),
                other => Err(E::custom(format!("invalid flag value '{other}'"))),
            },
        }
    }
}

/// `#[serde(deserialize_with = "deserialize_flag")]` for `bool` fields.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    RawFlag::deserialize(deserializer)?.into_bool()
}

/// `#[serde(default, deserialize_with = "deserialize_optional_flag")]` for `Option<bool>` fields.
pub fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawFlag>::deserialize(deserializer)? {
        Some(raw) => raw.into_bool().map(Some),
        None => Ok(None),
    }
}

/// `#[serde(default, deserialize_with = "deserialize_present")]` for
/// `Option<Option<T>>` patch fields.
///
/// An absent key stays `None` (leave unchanged) via `default`; an explicit
/// `null` becomes `Some(None)` (clear).
pub fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse a date given as `YYYY-MM-DD` or an RFC 3339 timestamp (its UTC date is kept).
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    Date::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Parse an instant given as RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            Date::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

fn blank_to_none(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// `#[serde(default, deserialize_with = "deserialize_optional_date")]` for `Option<Date>` fields.
///
/// Accepts `YYYY-MM-DD`, a full RFC 3339 timestamp, `null`, or an empty string.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_to_none(Option::<String>::deserialize(deserializer)?) {
        None => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'"))),
    }
}

/// Patch form of [`deserialize_optional_date`]: `null` or `""` clears the date.
pub fn deserialize_date_patch<'de, D>(deserializer: D) -> Result<Option<Option<Date>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_date(deserializer).map(Some)
}

/// Patch field for an instant: `null` or `""` clears it.
pub fn deserialize_timestamp_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<Timestamp>>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_to_none(Option::<String>::deserialize(deserializer)?) {
        None => Ok(Some(None)),
        Some(raw) => parse_timestamp(&raw)
            .map(|ts| Some(Some(ts)))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
    }
}

/// `#[serde(default, deserialize_with = "deserialize_optional_decimal")]` for money fields.
///
/// Accepts a JSON number, a numeric string, `null`, or an empty string.
pub fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!("invalid amount {other}")));
        }
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("invalid amount '{raw}'")))
}

/// Patch form of [`deserialize_optional_decimal`]: `null` or `""` clears the amount.
pub fn deserialize_decimal_patch<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_decimal(deserializer).map(Some)
}
