use super::{Point2, TOLERANCE};

/// An axis-aligned rectangle in projected space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2 {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl Rect2 {
    /// Builds a rectangle from two arbitrary opposite corners.
    #[must_use]
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Returns `true` if `p` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Clips the segment `a → b` against `rect` (Liang–Barsky).
///
/// Returns the parameter range `(t0, t1)` with `0 ≤ t0 ≤ t1 ≤ 1` of the part
/// of the segment lying inside the rectangle, or `None` if the segment misses
/// it entirely. A segment that only touches a corner yields `t0 == t1`.
#[must_use]
pub fn clip_segment(a: &Point2, b: &Point2, rect: &Rect2) -> Option<(f64, f64)> {
    let d = b - a;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    // (p, q) pairs for the left, right, bottom and top edges.
    let edges = [
        (-d.x, a.x - rect.min.x),
        (d.x, rect.max.x - a.x),
        (-d.y, a.y - rect.min.y),
        (d.y, rect.max.y - a.y),
    ];

    for (p, q) in edges {
        if p.abs() < TOLERANCE {
            // Parallel to this edge: reject if outside it.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((t0, t1))
}
