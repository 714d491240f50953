use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Spherical-Earth approximation radius, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Coordinate
///
/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// distance_km
///
/// Great-circle distance between two coordinates via the haversine formula.
/// Non-negative, symmetric, and zero exactly when both points coincide.
///
/// Inputs must be finite; callers filter non-finite coordinates before
/// invoking (see the catalog's corrupt-record handling).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + (d_lng / 2.0).sin().powi(2) * a.lat.to_radians().cos() * b.lat.to_radians().cos();
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// parse_latlng
///
/// Parses the stored `"lat,lng"` text form into a coordinate. Returns `None`
/// unless the string splits into exactly two comma-separated tokens that both
/// parse as finite numbers.
pub fn parse_latlng(text: &str) -> Option<Coordinate> {
    let mut parts = text.split(',');
    let lat: f64 = parts.next()?.trim().parse().ok()?;
    let lng: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if !lat.is_finite() || !lng.is_finite() {
        return None;
    }
    Some(Coordinate { lat, lng })
}

/// Rounds a distance to two decimal places for response payloads.
pub fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}
