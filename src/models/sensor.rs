//! Live sensor readings.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// A successful `/api/sensor-data` answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub soil_moisture: f64,
    /// °C
    pub temperature: f64,
    /// Relative humidity, %
    pub humidity: f64,
    pub rain_value: f64,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub timestamp: NaiveDateTime,
}

/// Accept RFC 3339 (kept as wall-clock time in its own offset) as well as
/// the naive ISO 8601 the IoT device emits.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognised timestamp '{raw}'"))
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
