//! Classification of raw JSON payloads.
//!
//! Sources publish contact logs in a few different shapes. Classifying the
//! payload once up front keeps the shape checks in one place:
//!
//! 1. a bare array of contacts,
//! 2. an object wrapping the array under `contacts` or `qsos`, optionally
//!    with a `home` location,
//! 3. an object carrying already-computed statistics (`total` or `count`).
//!
//! Anything else is [`Payload::Invalid`].

use qso_widget_stats_models::GeoPoint;
use serde_json::{Map, Value};

/// Keys that may hold the contact array in a wrapped payload, in priority
/// order.
pub const CONTACT_KEYS: &[&str] = &["contacts", "qsos"];

/// Keys whose presence marks an object as precomputed statistics.
pub const PRECOMPUTED_KEYS: &[&str] = &["total", "count"];

/// A JSON payload classified by shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    /// The payload itself is the contact array.
    ContactList(&'a [Value]),
    /// The contact array is wrapped in an object.
    WrappedContactList {
        /// The contact array.
        contacts: &'a [Value],
        /// Reference point for distances, if supplied.
        home: Option<GeoPoint>,
    },
    /// The object already holds summary statistics.
    PrecomputedStats(&'a Map<String, Value>),
    /// None of the accepted shapes.
    Invalid,
}

impl<'a> Payload<'a> {
    /// Classifies a parsed JSON value.
    #[must_use]
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(contacts) => Self::ContactList(contacts),
            Value::Object(map) => Self::classify_object(map),
            _ => Self::Invalid,
        }
    }

    fn classify_object(map: &'a Map<String, Value>) -> Self {
        let wrapped = CONTACT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array));

        if let Some(contacts) = wrapped {
            let home = map.get("home").and_then(GeoPoint::from_value);
            return Self::WrappedContactList { contacts, home };
        }

        if PRECOMPUTED_KEYS.iter().any(|key| map.contains_key(*key)) {
            return Self::PrecomputedStats(map);
        }

        Self::Invalid
    }

    /// Short name of the shape, for log messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ContactList(_) => "contact_list",
            Self::WrappedContactList { .. } => "wrapped_contact_list",
            Self::PrecomputedStats(_) => "precomputed_stats",
            Self::Invalid => "invalid",
        }
    }
}
