#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Contact record and QSO statistics types.
//!
//! A contact log arrives as loosely-shaped JSON: every field is optional and
//! a field carrying the wrong JSON type is treated the same as a missing
//! one. [`Contact::from_value`] performs that lenient extraction so the
//! statistics code only ever sees typed, optional values.

use serde::{Deserialize, Serialize};

/// Date fields checked on each contact, in priority order.
pub const DATE_FIELDS: &[&str] = &["qso_date", "time", "date"];

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a point from a latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Reads a point from a JSON object with numeric `lat` and `lon` fields.
    ///
    /// Returns `None` if either field is missing or not a JSON number.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let lat = value.get("lat")?.as_f64()?;
        let lon = value.get("lon")?.as_f64()?;
        Some(Self { lat, lon })
    }
}

/// One logged contact (QSO).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    /// The other station's callsign.
    pub call: Option<String>,
    /// First non-empty value among [`DATE_FIELDS`].
    pub date: Option<String>,
    /// Location of the other station, when both coordinates are numeric.
    pub location: Option<GeoPoint>,
}

impl Contact {
    /// Extracts a contact from an arbitrary JSON value.
    ///
    /// Non-object values produce an empty contact (it still counts toward
    /// the total). Empty strings are treated as absent.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        let call = non_empty_str(value, "call");
        let date = DATE_FIELDS
            .iter()
            .find_map(|field| non_empty_str(value, field));
        let location = GeoPoint::from_value(value);

        Self {
            call,
            date,
            location,
        }
    }
}

fn non_empty_str(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Summary statistics for a contact log.
///
/// Optional fields distinguish "no data" from zero: a log with no dated
/// contacts has no `first_qso`, not an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QsoStats {
    /// Number of contacts.
    pub total: u64,
    /// Number of distinct callsigns (case-sensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_calls: Option<u64>,
    /// Lexicographically smallest contact date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_qso: Option<String>,
    /// Lexicographically largest contact date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_qso: Option<String>,
    /// Longest distance from home, rounded to whole miles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longest_miles: Option<u64>,
    /// Callsign of the contact at [`Self::longest_miles`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longest_call: Option<String>,
}
