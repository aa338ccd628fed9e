use serde::{Deserialize, Serialize};

use crate::math::geodesic::haversine_m;

/// A geographic position in degrees. Serializes as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new position.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Distance in meters to `other`, using the renderer's spherical metric.
    #[must_use]
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        haversine_m(self.lat, self.lng, other.lat, other.lng)
    }

    /// Linear interpolation in degree space; `t = 0` is `self`.
    #[must_use]
    pub fn lerp(&self, other: &LatLng, t: f64) -> LatLng {
        LatLng {
            lat: self.lat + (other.lat - self.lat) * t,
            lng: self.lng + (other.lng - self.lng) * t,
        }
    }

    /// Returns `true` if both components are finite and within WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

/// A geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Bounds spanned by two opposite corners given in any order.
    #[must_use]
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            south: a.lat.min(b.lat),
            west: a.lng.min(b.lng),
            north: a.lat.max(b.lat),
            east: a.lng.max(b.lng),
        }
    }

    /// Bounds of a point set, or `None` if it is empty.
    #[must_use]
    pub fn of_points(points: &[LatLng]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Self::from_corners(*first, *first);
        for p in &points[1..] {
            b.south = b.south.min(p.lat);
            b.west = b.west.min(p.lng);
            b.north = b.north.max(p.lat);
            b.east = b.east.max(p.lng);
        }
        Some(b)
    }

    /// Returns `true` if the two boxes overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &GeoBounds) -> bool {
        self.south <= other.north
            && other.south <= self.north
            && self.west <= other.east
            && other.west <= self.east
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_lat_lng_pair() {
        let json = serde_json::to_string(&LatLng::new(51.5, -0.12)).unwrap();
        assert_eq!(json, "[51.5,-0.12]");
        let back: LatLng = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LatLng::new(51.5, -0.12));
    }

    #[test]
    fn lerp_midpoint() {
        let m = LatLng::new(0.0, 0.0).lerp(&LatLng::new(2.0, 4.0), 0.5);
        assert_eq!(m, LatLng::new(1.0, 2.0));
    }

    #[test]
    fn validity() {
        assert!(LatLng::new(10.0, 20.0).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn bounds_intersection() {
        let a = GeoBounds::from_corners(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0));
        let b = GeoBounds::from_corners(LatLng::new(0.5, 0.5), LatLng::new(2.0, 2.0));
        let c = GeoBounds::from_corners(LatLng::new(3.0, 3.0), LatLng::new(4.0, 4.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn bounds_of_points() {
        let b = GeoBounds::of_points(&[
            LatLng::new(1.0, 5.0),
            LatLng::new(-1.0, 2.0),
            LatLng::new(0.0, 7.0),
        ])
        .unwrap();
        assert_eq!(b, GeoBounds { south: -1.0, west: 2.0, north: 1.0, east: 7.0 });
        assert!(GeoBounds::of_points(&[]).is_none());
    }
}
