//! Great-circle distance between two points.

use qso_widget_stats_models::GeoPoint;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Returns the haversine distance between `from` and `to` in statute miles.
///
/// Coordinates are not validated; out-of-range inputs yield whatever the
/// formula produces, and NaN inputs yield NaN.
#[must_use]
pub fn haversine_miles(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}
