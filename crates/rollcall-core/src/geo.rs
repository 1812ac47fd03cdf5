//! Geodesic math primitives.
//!
//! Pure functions with no state: great-circle distance between two GPS
//! coordinates and a point-in-polygon containment test. Inputs are decimal
//! degrees; no range validation is performed, so NaN or out-of-range
//! coordinates propagate to the result.

use crate::types::GeoPoint;

/// Mean Earth radius in meters, as used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle (haversine) distance in meters between two coordinates.
#[must_use]
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Even-odd ray-casting containment test.
///
/// Edges are taken from the vertex sequence with wraparound (the last vertex
/// connects back to the first). Membership of points exactly on an edge is
/// unspecified, which is the standard ray-casting ambiguity.
#[must_use]
pub fn point_in_polygon(lat: f64, lon: f64, vertices: &[GeoPoint]) -> bool {
    let n = vertices.len();
    let mut inside = false;

    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (lat_i, lon_i) = (vertices[i].latitude, vertices[i].longitude);
        let (lat_j, lon_j) = (vertices[j].latitude, vertices[j].longitude);

        if (lon_i > lon) != (lon_j > lon)
            && lat < (lat_j - lat_i) * (lon - lon_i) / (lon_j - lon_i) + lat_i
        {
            inside = !inside;
        }

        j = i;
    }

    inside
}
