use super::latlng::LatLng;

/// Cumulative distance in meters at each vertex of a polyline.
///
/// Invariants: `cum[0] == 0`, non-decreasing, one entry per source vertex.
/// Duplicate consecutive vertices produce a zero-length step so indices stay
/// aligned with the source geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeTable {
    cum: Vec<f64>,
}

impl CumulativeTable {
    /// Builds the table in one pass over `vertices`.
    #[must_use]
    pub fn build(vertices: &[LatLng]) -> Self {
        let mut cum = Vec::with_capacity(vertices.len());
        let mut acc = 0.0;
        for (i, v) in vertices.iter().enumerate() {
            if i > 0 {
                acc += vertices[i - 1].distance_to(v);
            }
            cum.push(acc);
        }
        Self { cum }
    }

    /// Cumulative meters per vertex.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.cum
    }

    /// Total length of the polyline in meters.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.cum.last().copied().unwrap_or(0.0)
    }

    /// Meter offset of the point at parameter `t` on segment `seg`.
    #[must_use]
    pub fn meters_at(&self, seg: usize, t: f64) -> f64 {
        let a = self.cum[seg];
        let b = self.cum[(seg + 1).min(self.cum.len() - 1)];
        a + (b - a) * t
    }

    /// Finds the segment containing meter offset `m` (clamped to the line).
    ///
    /// Returns `(segment_index, t)` such that `meters_at(segment_index, t) == m`.
    /// Zero-length segments are never returned unless the whole tail of the
    /// line is degenerate.
    #[must_use]
    pub fn locate(&self, m: f64) -> (usize, f64) {
        let n = self.cum.len();
        if n < 2 {
            return (0, 0.0);
        }
        let m = m.clamp(0.0, self.total_length());
        // First vertex strictly beyond `m`; the segment ending there holds `m`.
        let idx = self.cum.partition_point(|&c| c <= m);
        let seg = idx.saturating_sub(1).min(n - 2);
        let a = self.cum[seg];
        let len = self.cum[seg + 1] - a;
        let t = if len > 0.0 { ((m - a) / len).clamp(0.0, 1.0) } else { 0.0 };
        (seg, t)
    }
}
