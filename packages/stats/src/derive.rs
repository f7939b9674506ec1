//! Reduction of a classified payload to a [`QsoStats`] record.

use std::collections::BTreeSet;

use qso_widget_stats_models::{Contact, GeoPoint, QsoStats};
use serde_json::{Map, Value};

use crate::StatsError;
use crate::distance::haversine_miles;
use crate::payload::Payload;

/// Classifies `value` and derives its statistics.
///
/// # Errors
///
/// Returns [`StatsError::UnexpectedFormat`] if the value matches none of the
/// accepted payload shapes.
pub fn stats_from_value(value: &Value) -> Result<QsoStats, StatsError> {
    derive_stats(&Payload::classify(value))
}

/// Derives statistics from a classified payload.
///
/// # Errors
///
/// Returns [`StatsError::UnexpectedFormat`] for [`Payload::Invalid`].
pub fn derive_stats(payload: &Payload<'_>) -> Result<QsoStats, StatsError> {
    log::debug!("Deriving stats from {} payload", payload.kind());

    match *payload {
        Payload::ContactList(contacts) => Ok(summarize_contacts(contacts, None)),
        Payload::WrappedContactList { contacts, home } => Ok(summarize_contacts(contacts, home)),
        Payload::PrecomputedStats(map) => Ok(passthrough(map)),
        Payload::Invalid => Err(StatsError::UnexpectedFormat),
    }
}

/// Computes statistics over a contact array.
///
/// Distances are only measured when `home` is supplied.
#[must_use]
pub fn summarize_contacts(values: &[Value], home: Option<GeoPoint>) -> QsoStats {
    let contacts: Vec<Contact> = values.iter().map(Contact::from_value).collect();

    let calls: BTreeSet<&str> = contacts.iter().filter_map(|c| c.call.as_deref()).collect();

    let mut dates: Vec<&str> = contacts.iter().filter_map(|c| c.date.as_deref()).collect();
    dates.sort_unstable();

    let (longest_miles, longest_call) = home
        .and_then(|home| longest_contact(&contacts, home))
        .map_or((None, None), |(miles, call)| {
            (Some(round_miles(miles)), Some(call.to_owned()))
        });

    QsoStats {
        total: contacts.len() as u64,
        unique_calls: Some(calls.len() as u64),
        first_qso: dates.first().map(|s| (*s).to_owned()),
        last_qso: dates.last().map(|s| (*s).to_owned()),
        longest_miles,
        longest_call,
    }
}

/// Finds the contact farthest from `home` with a positive distance.
///
/// Ties keep the earliest contact. A farthest contact without a callsign
/// yields `None` so distance and callsign are always reported together.
fn longest_contact(contacts: &[Contact], home: GeoPoint) -> Option<(f64, &str)> {
    let mut longest: Option<(f64, &Contact)> = None;

    for contact in contacts {
        let Some(location) = contact.location else {
            continue;
        };
        let miles = haversine_miles(home, location);
        if miles > longest.map_or(0.0, |(best, _)| best) {
            longest = Some((miles, contact));
        }
    }

    let (miles, contact) = longest?;
    let Some(call) = contact.call.as_deref() else {
        log::debug!("Farthest contact ({miles:.1} mi) has no callsign, omitting distance");
        return None;
    };

    Some((miles, call))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_miles(miles: f64) -> u64 {
    miles.round() as u64
}

/// Copies precomputed statistics through, accepting synonym field names.
///
/// Falsy values (`0`, `""`, `null`, `false`) count as absent, and `total`
/// falls back to zero.
fn passthrough(map: &Map<String, Value>) -> QsoStats {
    QsoStats {
        total: first_count(map, &["total", "count"]).unwrap_or(0),
        unique_calls: first_count(map, &["unique_calls", "unique"]),
        first_qso: first_text(map, &["first_qso"]),
        last_qso: first_text(map, &["last_qso"]),
        longest_miles: first_count(map, &["longest_miles"]),
        longest_call: first_text(map, &["longest_call"]),
    }
}

fn first_count(map: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| map.get(*key).and_then(as_count))
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.get(*key).and_then(as_text))
}

/// Reads a positive count from a JSON number or numeric string.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n > 0.0).then(|| n.round() as u64)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}
