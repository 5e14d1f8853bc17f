/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::{Error, Result};

/// A sample time as the backend reported it. Change points are
/// matched against these raw values, never against the normalized
/// timestamp. Numbers compare by value (`1000` and `1000.0` are the
/// same time); strings compare verbatim.
#[derive(Serialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
#[serde(untagged)]
pub enum SampleTime {
    Epoch(i64),
    /// Only for numbers with a fractional part; integral values are
    /// kept as `Epoch`.
    Fractional(OrderedFloat<f64>),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSampleTime {
    Epoch(i64),
    Fractional(f64),
    Text(String),
}

/// Unit of numeric sample times.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Debug)]
#[serde(rename_all = "snake_case")]
pub enum EpochUnit {
    Seconds,
    #[default]
    Millis,
    Micros,
}

/// Canonical, timezone-independent row timestamp with millisecond
/// precision. Ordering is chronological.
#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug,
)]
pub struct Timestamp(DateTime<Utc>);

impl<'de> Deserialize<'de> for SampleTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match RawSampleTime::deserialize(deserializer)? {
            RawSampleTime::Epoch(n) => Self::Epoch(n),
            RawSampleTime::Fractional(v) => Self::from_f64(v),
            RawSampleTime::Text(s) => Self::Text(s),
        })
    }
}

impl SampleTime {
    pub fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Self::Epoch(value as i64)
        } else {
            Self::Fractional(OrderedFloat(value))
        }
    }

    /// Integral fractional values become `Epoch`.
    pub fn canonical(self) -> Self {
        match self {
            Self::Fractional(OrderedFloat(v)) => Self::from_f64(v),
            other => other,
        }
    }

    pub fn to_timestamp(&self, unit: EpochUnit) -> Result<Timestamp> {
        match self {
            SampleTime::Epoch(n) => {
                let millis = match unit {
                    EpochUnit::Seconds => n.checked_mul(1000),
                    EpochUnit::Millis => Some(*n),
                    EpochUnit::Micros => Some(n.div_euclid(1000)),
                }
                .ok_or(Error::TimestampOutOfRange(*n))?;
                Timestamp::from_millis(millis)
            }
            SampleTime::Fractional(OrderedFloat(v)) => {
                let millis = match unit {
                    EpochUnit::Seconds => v * 1000.0,
                    EpochUnit::Millis => *v,
                    EpochUnit::Micros => v / 1000.0,
                }
                .trunc();
                if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
                    return Err(Error::InvalidTimestamp(v.to_string()));
                }
                Timestamp::from_millis(millis as i64)
            }
            SampleTime::Text(s) => Timestamp::from_str(s),
        }
    }
}

impl Display for SampleTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleTime::Epoch(n) => write!(f, "{n}"),
            SampleTime::Fractional(v) => write!(f, "{v}"),
            SampleTime::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for SampleTime {
    fn from(value: i64) -> Self {
        Self::Epoch(value)
    }
}

impl From<f64> for SampleTime {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<&str> for SampleTime {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl Timestamp {
    pub fn from_millis(millis: i64) -> Result<Self> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Self)
            .ok_or(Error::TimestampOutOfRange(millis))
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        // Rows are keyed at millisecond precision.
        Self::from_millis(dt.timestamp_millis()).unwrap_or(Self(dt))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    /// Accepts RFC 3339, or an ISO date-time or date without offset,
    /// which is taken as UTC.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_datetime(dt.with_timezone(&Utc)));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .into_iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .map(|naive| Self::from_datetime(Utc.from_utc_datetime(&naive)))
            .ok_or_else(|| Error::InvalidTimestamp(s.to_string()))
    }
}

/// Query window in microseconds since the epoch. Unset bounds are
/// left to the backend.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct TimeRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeRange {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start.timestamp_micros()),
            end: Some(end.timestamp_micros()),
        }
    }

    /// The window of the given length ending now.
    pub fn last(duration: chrono::Duration) -> Self {
        let end = Utc::now();
        Self::between(end - duration, end)
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        self.start
            .map(|start| ("start_time", start.to_string()))
            .into_iter()
            .chain(self.end.map(|end| ("end_time", end.to_string())))
            .collect()
    }
}
