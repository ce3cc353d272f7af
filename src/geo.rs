//! Great-circle distance between geographic coordinates

use crate::types::Coordinate;

/// Earth radius in kilometers used by the haversine formula
const EARTH_RADIUS_KM: f64 = 6378.137;

/// Great-circle distance in kilometers between two coordinates.
///
/// Pure and symmetric; returns exactly zero for identical coordinates.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_KM * c
}
