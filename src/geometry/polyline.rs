use crate::error::GeometryError;
use crate::math::Point2;

use super::latlng::{GeoBounds, LatLng};
use super::projection::Projector;

/// A simple open polyline of geographic vertices.
///
/// Immutable once built; identified externally by `(feature_id, line_index)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    vertices: Vec<LatLng>,
    bounds: GeoBounds,
}

impl Polyline {
    /// Creates a polyline, rejecting fewer than 2 vertices or invalid
    /// coordinates.
    ///
    /// # Errors
    ///
    /// - `GeometryError::TooFewPoints` for fewer than 2 vertices
    /// - `GeometryError::InvalidCoordinate` for non-finite or out-of-range
    ///   positions
    pub fn new(vertices: Vec<LatLng>) -> Result<Self, GeometryError> {
        if vertices.len() < 2 {
            return Err(GeometryError::TooFewPoints(vertices.len()));
        }
        if let Some(bad) = vertices.iter().find(|v| !v.is_valid()) {
            return Err(GeometryError::InvalidCoordinate(format!(
                "({}, {})",
                bad.lat, bad.lng
            )));
        }
        let bounds = GeoBounds::of_points(&vertices)
            .ok_or(GeometryError::TooFewPoints(0))?;
        Ok(Self { vertices, bounds })
    }

    /// The ordered vertices.
    #[must_use]
    pub fn vertices(&self) -> &[LatLng] {
        &self.vertices
    }

    /// Geographic bounding box.
    #[must_use]
    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    /// Projects every vertex into the projector's planar space.
    #[must_use]
    pub fn project<P: Projector + ?Sized>(&self, projector: &P) -> Vec<Point2> {
        self.vertices.iter().map(|v| projector.project(v)).collect()
    }

    /// Point at parameter `t` on segment `seg`, interpolated in degree space.
    ///
    /// `t <= 0` and `t >= 1` return the segment's vertices exactly.
    #[must_use]
    pub fn point_at(&self, seg: usize, t: f64) -> LatLng {
        let a = self.vertices[seg];
        let b = self.vertices[(seg + 1).min(self.vertices.len() - 1)];
        if t <= 0.0 {
            a
        } else if t >= 1.0 {
            b
        } else {
            a.lerp(&b, t)
        }
    }
}
