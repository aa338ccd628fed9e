use serde::{Deserialize, Serialize};

/// A closed 1-D range `[start, end]` in meters along one polyline.
///
/// Invariant: `start <= end`. Intervals of zero or negative length are
/// treated as degenerate and dropped by every operation in this module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Creates an interval from two endpoints given in either order.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Length in meters.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Returns `true` if the interval has no positive length (or is NaN).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.length().is_nan() || self.length() <= 0.0
    }

    /// Returns `true` if the two intervals share a positive-length overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Clamps the interval to `[lo, hi]`. May produce a degenerate interval.
    #[must_use]
    pub fn clamp(&self, lo: f64, hi: f64) -> Self {
        Self {
            start: self.start.clamp(lo, hi),
            end: self.end.clamp(lo, hi),
        }
    }
}

/// Sorts by start and coalesces overlapping or `eps`-adjacent intervals.
///
/// The result is sorted and pairwise disjoint with
/// `result[i].end + eps < result[i + 1].start`. Degenerate inputs are dropped.
#[must_use]
pub fn merge(list: &[Interval], eps: f64) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = list.iter().copied().filter(|iv| !iv.is_degenerate()).collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut out: Vec<Interval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match out.last_mut() {
            Some(last) if iv.start <= last.end + eps => {
                last.end = last.end.max(iv.end);
            }
            _ => out.push(iv),
        }
    }
    out
}

/// Returns the parts of `target` not covered by `coverage`.
///
/// `coverage` need not be merged. When nothing in `coverage` overlaps
/// `target`, the result is `[target]`. Otherwise every remainder is adjacent
/// to a cut, and remainders shorter than `eps` are dropped.
#[must_use]
pub fn subtract(target: &Interval, coverage: &[Interval], eps: f64) -> Vec<Interval> {
    if target.is_degenerate() {
        return Vec::new();
    }

    let cuts: Vec<Interval> = merge(coverage, 0.0)
        .into_iter()
        .filter(|c| c.overlaps(target))
        .collect();
    if cuts.is_empty() {
        return vec![*target];
    }

    let mut out = Vec::new();
    let mut cursor = target.start;
    for c in &cuts {
        if c.start > cursor {
            push_remainder(&mut out, Interval::new(cursor, c.start), eps);
        }
        cursor = cursor.max(c.end);
        if cursor >= target.end {
            break;
        }
    }
    if cursor < target.end {
        push_remainder(&mut out, Interval::new(cursor, target.end), eps);
    }
    out
}

fn push_remainder(out: &mut Vec<Interval>, iv: Interval, eps: f64) {
    if iv.length() >= eps && !iv.is_degenerate() {
        out.push(iv);
    }
}

/// Stretches `pieces` so that no gap of at most `eps` separates them from
/// each other or from `fixed`.
///
/// `pieces` and `fixed` must be pairwise disjoint. Only pieces move: a gap
/// after a piece closes by pulling the following piece back, or by pushing
/// the piece forward when the next neighbour is fixed. Gaps between two
/// fixed intervals are left alone.
pub fn close_gaps(pieces: &mut [Interval], fixed: &[Interval], eps: f64) {
    // Each entry carries its piece index, or `None` when fixed.
    let fixed = merge(fixed, 0.0);
    let mut order: Vec<(Interval, Option<usize>)> = fixed
        .iter()
        .map(|iv| (*iv, None))
        .chain(pieces.iter().enumerate().map(|(i, iv)| (*iv, Some(i))))
        .collect();
    order.sort_by(|a, b| a.0.start.total_cmp(&b.0.start));

    for k in 1..order.len() {
        let prev_end = match order[k - 1].1 {
            Some(i) => pieces[i].end,
            None => order[k - 1].0.end,
        };
        let next_start = match order[k].1 {
            Some(j) => pieces[j].start,
            None => order[k].0.start,
        };
        let gap = next_start - prev_end;
        if gap <= 0.0 || gap > eps {
            continue;
        }
        match (order[k - 1].1, order[k].1) {
            (_, Some(j)) => pieces[j].start = prev_end,
            (Some(i), None) => pieces[i].end = next_start,
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 0.25;

    fn iv(a: f64, b: f64) -> Interval {
        Interval::new(a, b)
    }

    #[test]
    fn new_orders_endpoints() {
        let i = iv(50.0, 20.0);
        assert_eq!(i, Interval { start: 20.0, end: 50.0 });
        assert_abs_diff_eq!(i.length(), 30.0);
    }

    #[test]
    fn merge_coalesces_overlap_and_near_touch() {
        let merged = merge(&[iv(40.0, 70.0), iv(20.0, 50.0), iv(70.2, 80.0), iv(90.0, 95.0)], EPS);
        assert_eq!(merged, vec![iv(20.0, 80.0), iv(90.0, 95.0)]);
    }

    #[test]
    fn merge_keeps_gaps_larger_than_eps() {
        let merged = merge(&[iv(0.0, 10.0), iv(10.5, 20.0)], EPS);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].end + EPS < merged[1].start);
    }

    #[test]
    fn merge_drops_degenerate() {
        assert!(merge(&[iv(5.0, 5.0)], EPS).is_empty());
        assert!(merge(&[], EPS).is_empty());
    }

    #[test]
    fn subtract_nothing_is_identity() {
        assert_eq!(subtract(&iv(10.0, 20.0), &[], EPS), vec![iv(10.0, 20.0)]);
        // Even an interval shorter than eps survives when nothing cuts it.
        assert_eq!(subtract(&iv(10.0, 10.1), &[], EPS), vec![iv(10.0, 10.1)]);
    }

    #[test]
    fn subtract_self_is_empty() {
        assert!(subtract(&iv(10.0, 20.0), &[iv(10.0, 20.0)], EPS).is_empty());
    }

    #[test]
    fn subtract_splits_in_two() {
        let out = subtract(&iv(20.0, 70.0), &[iv(45.0, 55.0)], EPS);
        assert_eq!(out, vec![iv(20.0, 45.0), iv(55.0, 70.0)]);
    }

    #[test]
    fn subtract_trims_overlap() {
        let out = subtract(&iv(40.0, 70.0), &[iv(20.0, 50.0)], EPS);
        assert_eq!(out, vec![iv(50.0, 70.0)]);
    }

    #[test]
    fn subtract_drops_slivers() {
        let out = subtract(&iv(20.0, 50.0), &[iv(20.1, 49.9)], EPS);
        assert!(out.is_empty(), "{out:?}");
    }

    #[test]
    fn subtract_unsorted_coverage() {
        let out = subtract(&iv(0.0, 100.0), &[iv(60.0, 70.0), iv(10.0, 20.0), iv(15.0, 30.0)], EPS);
        assert_eq!(out, vec![iv(0.0, 10.0), iv(30.0, 60.0), iv(70.0, 100.0)]);
    }

    #[test]
    fn subtract_fully_covered_is_idempotent() {
        let cover = merge(&[iv(0.0, 50.0), iv(50.0, 100.0)], EPS);
        assert!(subtract(&iv(20.0, 80.0), &cover, EPS).is_empty());
    }

    #[test]
    fn close_gaps_pulls_piece_onto_fixed_end() {
        let mut pieces = [iv(10.2, 20.0)];
        close_gaps(&mut pieces, &[iv(0.0, 10.0)], EPS);
        assert_eq!(pieces, [iv(10.0, 20.0)]);
    }

    #[test]
    fn close_gaps_pushes_piece_onto_fixed_start() {
        let mut pieces = [iv(0.0, 9.9), iv(30.0, 40.0)];
        close_gaps(&mut pieces, &[iv(10.0, 20.0), iv(40.1, 50.0)], EPS);
        assert_eq!(pieces, [iv(0.0, 10.0), iv(30.0, 40.1)]);
    }

    #[test]
    fn close_gaps_joins_neighbouring_pieces() {
        let mut pieces = [iv(5.1, 8.0), iv(0.0, 5.0)];
        close_gaps(&mut pieces, &[], EPS);
        assert_eq!(pieces, [iv(5.0, 8.0), iv(0.0, 5.0)]);
    }

    #[test]
    fn close_gaps_leaves_wide_gaps_and_fixed_pairs() {
        let mut pieces = [iv(10.5, 20.0)];
        close_gaps(&mut pieces, &[iv(0.0, 10.0), iv(20.1, 30.0), iv(30.2, 40.0)], EPS);
        assert_eq!(pieces, [iv(10.5, 20.1)]);
    }
}
