use super::{Point2, TOLERANCE};

/// Closest point on the segment `a → b` to `p`.
///
/// Returns `(t, dist)` where `t ∈ [0, 1]` is the segment parameter of the
/// closest point and `dist` is the distance from `p` to it.
#[must_use]
pub fn closest_on_segment(p: &Point2, a: &Point2, b: &Point2) -> (f64, f64) {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < TOLERANCE * TOLERANCE {
        // Degenerate segment (zero length).
        return (0.0, (p - a).norm());
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    let closest = a + d * t;
    (t, (p - closest).norm())
}

/// Closest point on an open polyline to `p`.
///
/// Returns `(segment_index, t, dist)`, or `None` for fewer than 2 points.
/// Ties keep the earliest segment.
#[must_use]
pub fn closest_on_polyline(p: &Point2, points: &[Point2]) -> Option<(usize, f64, f64)> {
    let mut best: Option<(usize, f64, f64)> = None;
    for (i, w) in points.windows(2).enumerate() {
        let (t, dist) = closest_on_segment(p, &w[0], &w[1]);
        if best.is_none_or(|(_, _, d)| dist < d) {
            best = Some((i, t, dist));
        }
    }
    best
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn segment_dist_perpendicular_projection() {
        // Point (1, 1) to segment (0,0)→(2,0). Closest at (1,0), dist = 1.
        let (t, d) = closest_on_segment(
            &Point2::new(1.0, 1.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
        );
        assert!((t - 0.5).abs() < TOL, "t={t}");
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_endpoint_closest() {
        let (t, d) = closest_on_segment(
            &Point2::new(-1.0, 0.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
        );
        assert!(t.abs() < TOL);
        assert!((d - 1.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn segment_dist_degenerate() {
        let (_, d) = closest_on_segment(
            &Point2::new(3.0, 4.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn polyline_picks_nearest_segment() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ];
        let (seg, t, d) = closest_on_polyline(&Point2::new(12.0, 7.0), &pts).unwrap();
        assert_eq!(seg, 1);
        assert!((t - 0.7).abs() < TOL, "t={t}");
        assert!((d - 2.0).abs() < TOL, "d={d}");
    }

    #[test]
    fn polyline_needs_two_points() {
        assert!(closest_on_polyline(&Point2::origin(), &[Point2::origin()]).is_none());
    }
}
