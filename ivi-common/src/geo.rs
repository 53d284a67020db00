//! Geodesy helpers
//!
//! Great-circle distance on a spherical earth. Accurate to well under a percent
//! at city scale, which is all the route planner and alert geofences need.

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in kilometres
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(*self, *other)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// Haversine distance between two points in kilometres
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(37.7749, -122.4194);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_tenth_of_degree_longitude_at_equator() {
        // 0.05 degrees of longitude on the equator is ~5.56 km
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.05));
        assert!((d - 5.559).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_symmetry() {
        let a = GeoPoint::new(37.7749, -122.4194);
        let b = GeoPoint::new(37.7895, -122.3942);
        assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-12);
        // Downtown SF to SoMa is a couple of kilometres
        let d = a.distance_km(&b);
        assert!(d > 2.0 && d < 3.0, "got {}", d);
    }
}
