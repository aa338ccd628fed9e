use crate::dataset::LineData;
use crate::geometry::{LatLng, Projector};
use crate::math::clip_2d::{clip_segment, Rect2};
use crate::math::distance_2d::closest_on_polyline;
use crate::math::interval::Interval;
use crate::math::Point2;

/// Meter gap below which consecutive inside runs are joined. Runs meeting at
/// a shared vertex have bit-identical offsets; this only absorbs rounding.
const RUN_JOIN_TOL: f64 = 1e-9;

/// Computes the raw meter-intervals of a line lying inside a rectangle.
///
/// The rectangle lives in the projector's planar space; the returned offsets
/// come from the line's cumulative table, so they do not depend on zoom.
/// Output is sorted and unmerged against any existing coverage; merging and
/// subtracting is the caller's job.
#[derive(Debug, Clone, Copy)]
pub struct BoxFootprint {
    rect: Rect2,
    min_length: f64,
}

impl BoxFootprint {
    /// Creates a footprint query. Intervals shorter than `min_length` meters
    /// are discarded as sub-pixel noise.
    #[must_use]
    pub fn new(rect: Rect2, min_length: f64) -> Self {
        Self { rect, min_length }
    }

    /// Executes the query against one line.
    ///
    /// # Algorithm
    ///
    /// 1. Project the vertices into rectangle space.
    /// 2. Clip every segment (Liang–Barsky); fully inside segments keep
    ///    `[0, 1]`, crossing segments keep the clipped sub-range, outside
    ///    segments are skipped.
    /// 3. Map the clipped parameters to meters by linear interpolation in the
    ///    cumulative table.
    /// 4. Join runs that continue across a vertex, then drop short ones.
    #[must_use]
    pub fn execute<P: Projector + ?Sized>(&self, line: &LineData, projector: &P) -> Vec<Interval> {
        let points = line.polyline.project(projector);
        let mut runs: Vec<Interval> = Vec::new();

        for (seg, w) in points.windows(2).enumerate() {
            let Some((t0, t1)) = clip_segment(&w[0], &w[1], &self.rect) else {
                continue;
            };
            let m0 = line.table.meters_at(seg, t0);
            let m1 = line.table.meters_at(seg, t1);

            match runs.last_mut() {
                Some(run) if m0 <= run.end + RUN_JOIN_TOL => run.end = run.end.max(m1),
                _ => runs.push(Interval::new(m0, m1)),
            }
        }

        runs.retain(|iv| !iv.is_degenerate() && iv.length() >= self.min_length);
        runs
    }
}

/// Computes the span marked by a single click near a line.
///
/// The click is snapped to the nearest point on the line (in planar space)
/// and widened to `±half_width` meters, clamped to the line's ends.
#[derive(Debug, Clone, Copy)]
pub struct ClickFootprint {
    at: LatLng,
    half_width: f64,
    tolerance: f64,
}

/// A click snapped onto a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickHit {
    /// Planar distance from the click to the line.
    pub distance: f64,
    /// Meter offset of the snapped point.
    pub at_m: f64,
    /// The marked span.
    pub interval: Interval,
}

impl ClickFootprint {
    /// Creates a click query. Lines farther than `tolerance` planar units
    /// from the click are ignored.
    #[must_use]
    pub fn new(at: LatLng, half_width: f64, tolerance: f64) -> Self {
        Self {
            at,
            half_width,
            tolerance,
        }
    }

    /// Executes the query against one line. Returns `None` when the line is
    /// out of reach or the clamped span has no length.
    #[must_use]
    pub fn execute<P: Projector + ?Sized>(&self, line: &LineData, projector: &P) -> Option<ClickHit> {
        let click = projector.project(&self.at);

        // Quick reject against the projected bounds, grown by the tolerance.
        let b = line.polyline.bounds();
        let reach = projector.project_rect(
            &LatLng::new(b.south, b.west),
            &LatLng::new(b.north, b.east),
        );
        let grown = Rect2 {
            min: Point2::new(reach.min.x - self.tolerance, reach.min.y - self.tolerance),
            max: Point2::new(reach.max.x + self.tolerance, reach.max.y + self.tolerance),
        };
        if !grown.contains(&click) {
            return None;
        }

        let points = line.polyline.project(projector);
        let (seg, t, distance) = closest_on_polyline(&click, &points)?;
        if distance > self.tolerance {
            return None;
        }

        let at_m = line.table.meters_at(seg, t);
        let interval = Interval::new(at_m - self.half_width, at_m + self.half_width)
            .clamp(0.0, line.total_length());
        if interval.is_degenerate() {
            return None;
        }
        Some(ClickHit {
            distance,
            at_m,
            interval,
        })
    }
}
