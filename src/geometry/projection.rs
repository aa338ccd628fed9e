use std::f64::consts::PI;

use crate::math::clip_2d::Rect2;
use crate::math::geodesic::EARTH_RADIUS_M;
use crate::math::Point2;

use super::latlng::LatLng;

/// Maps geographic positions into the planar space a selection rectangle is
/// drawn in.
///
/// Used only for containment tests. Distances along lines always come from
/// the geographic metric, so selection results do not depend on zoom.
pub trait Projector {
    /// Projects a geographic position into planar space.
    fn project(&self, p: &LatLng) -> Point2;

    /// Projects two geographic corners into a normalized planar rectangle.
    fn project_rect(&self, a: &LatLng, b: &LatLng) -> Rect2 {
        Rect2::from_corners(self.project(a), self.project(b))
    }
}

/// Equirectangular projection about an origin, in meters.
///
/// `x` grows east, `y` grows north. Accurate to well under the coverage
/// tolerance within a few kilometers of the origin.
#[derive(Debug, Clone, Copy)]
pub struct LocalTangentPlane {
    origin: LatLng,
    cos_lat: f64,
}

impl LocalTangentPlane {
    /// Creates a projection centered on `origin`.
    #[must_use]
    pub fn new(origin: LatLng) -> Self {
        Self {
            origin,
            cos_lat: origin.lat.to_radians().cos(),
        }
    }
}

impl Projector for LocalTangentPlane {
    fn project(&self, p: &LatLng) -> Point2 {
        let x = (p.lng - self.origin.lng).to_radians() * self.cos_lat * EARTH_RADIUS_M;
        let y = (p.lat - self.origin.lat).to_radians() * EARTH_RADIUS_M;
        Point2::new(x, y)
    }
}

/// Spherical web-mercator pixel space at a zoom level (256 px tiles).
///
/// `y` grows south, as in screen space.
#[derive(Debug, Clone, Copy)]
pub struct WebMercator {
    scale: f64,
}

/// Latitude limit of the square web-mercator world.
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

impl WebMercator {
    /// Creates a projection for `zoom` (fractional zooms allowed).
    #[must_use]
    pub fn new(zoom: f64) -> Self {
        Self {
            scale: 256.0 * zoom.exp2(),
        }
    }
}

impl Projector for WebMercator {
    fn project(&self, p: &LatLng) -> Point2 {
        let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (p.lng + 180.0) / 360.0;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
        Point2::new(x * self.scale, y * self.scale)
    }
}
