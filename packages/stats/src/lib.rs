#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statistics derivation for QSO contact logs.
//!
//! A payload is classified once into a [`payload::Payload`] variant and then
//! reduced to a [`QsoStats`] record by [`derive::derive_stats`]. Distances
//! use the haversine formula in [`distance`].

pub mod derive;
pub mod distance;
pub mod payload;

pub use derive::{derive_stats, stats_from_value};
pub use qso_widget_stats_models::{Contact, GeoPoint, QsoStats};

/// Errors from statistics derivation.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// The JSON payload matches none of the accepted shapes.
    #[error("Unexpected JSON format")]
    UnexpectedFormat,
}
