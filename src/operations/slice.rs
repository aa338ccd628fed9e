use crate::dataset::LineData;
use crate::error::CoverageError;
use crate::geometry::LatLng;
use crate::math::interval::Interval;

/// Materializes the coordinates of a meter range along a line.
///
/// Cut points are interpolated inside their segments rather than snapped to
/// vertices, so an overlay drawn from the result lies exactly on the base
/// line.
#[derive(Debug, Clone, Copy)]
pub struct SliceLine {
    range: Interval,
}

impl SliceLine {
    /// Creates a new slice operation for `[start_m, end_m]`.
    #[must_use]
    pub fn new(start_m: f64, end_m: f64) -> Self {
        Self {
            range: Interval {
                start: start_m,
                end: end_m,
            },
        }
    }

    /// Executes the slice.
    ///
    /// The range is clamped to `[0, total_length]`. Output starts at the
    /// interpolated start point, includes every vertex strictly inside the
    /// range (zero-length steps included), and ends at the interpolated end
    /// point.
    ///
    /// # Errors
    ///
    /// - `CoverageError::DegenerateInterval` if `end_m <= start_m`, or the
    ///   clamped range has no length
    /// - `CoverageError::OutOfRange` if the range lies entirely outside the line
    pub fn execute(&self, line: &LineData) -> Result<Vec<LatLng>, CoverageError> {
        let Interval { start, end } = self.range;
        if self.range.is_degenerate() {
            return Err(CoverageError::DegenerateInterval { start, end });
        }

        let total = line.total_length();
        if end < 0.0 || start > total {
            return Err(CoverageError::OutOfRange { start, end, total });
        }
        let clamped = self.range.clamp(0.0, total);
        if clamped.is_degenerate() {
            return Err(CoverageError::DegenerateInterval {
                start: clamped.start,
                end: clamped.end,
            });
        }

        let cum = line.table.as_slice();
        let vertices = line.polyline.vertices();
        let (s_seg, s_t) = line.table.locate(clamped.start);
        let (e_seg, e_t) = line.table.locate(clamped.end);

        let mut coords = Vec::with_capacity(e_seg.saturating_sub(s_seg) + 2);
        coords.push(line.polyline.point_at(s_seg, s_t));
        for k in (s_seg + 1)..=e_seg {
            if cum[k] > clamped.start && cum[k] < clamped.end {
                coords.push(vertices[k]);
            }
        }
        coords.push(line.polyline.point_at(e_seg, e_t));
        Ok(coords)
    }
}
