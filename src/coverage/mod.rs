mod history;
mod part;

pub use history::{History, Snapshot};
pub use part::{Part, PartId, Provenance};

use std::collections::{BTreeMap, HashSet};

use crate::config::CoverageConfig;
use crate::dataset::{GeometryStore, LineData, LineKey};
use crate::error::CoverageError;
use crate::geometry::{GeoBounds, LatLng, Projector};
use crate::math::interval::{close_gaps, merge, subtract, Interval};
use crate::operations::{BoxFootprint, ClickFootprint, ClickHit, SliceLine};

/// Whether a rectangle adds to or erases from the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Add,
    Erase,
}

/// A selection rectangle given by two opposite geographic corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub a: LatLng,
    pub b: LatLng,
}

impl SelectionRect {
    /// Creates a rectangle from two corners in any order.
    #[must_use]
    pub fn new(a: LatLng, b: LatLng) -> Self {
        Self { a, b }
    }
}

/// Which of the two parallel Part lists to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Draft,
    Committed,
}

/// Outcome of one user action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditReport {
    /// Parts created by the action.
    pub added: Vec<PartId>,
    /// Parts removed (or replaced by re-sliced remainders).
    pub removed: Vec<PartId>,
    /// Lines that could not be processed, with the reason.
    pub skipped: Vec<(LineKey, CoverageError)>,
}

impl EditReport {
    /// Returns `true` if the action changed any Part list.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    fn skip(&mut self, key: &LineKey, err: CoverageError) {
        tracing::debug!(%key, %err, "line skipped");
        self.skipped.push((key.clone(), err));
    }
}

/// Draft and committed coverage for every line of one module session.
///
/// The only writer of coverage state. Every operation reads the affected
/// line's Parts, computes the replacement, and swaps it in, so a failure on
/// one line never leaves another half-updated.
#[derive(Debug, Clone)]
pub struct CoverageStore {
    config: CoverageConfig,
    draft: Vec<Part>,
    committed: Vec<Part>,
    next_id: u64,
}

impl CoverageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: CoverageConfig) -> Self {
        Self::from_parts(config, Vec::new(), Vec::new())
    }

    /// Creates a store from previously persisted Parts. Id allocation resumes
    /// after the highest id seen.
    #[must_use]
    pub fn from_parts(config: CoverageConfig, draft: Vec<Part>, committed: Vec<Part>) -> Self {
        let next_id = draft
            .iter()
            .chain(&committed)
            .map(|p| p.id.0 + 1)
            .max()
            .unwrap_or(1);
        Self {
            config,
            draft,
            committed,
            next_id,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Draft Parts, in creation order.
    #[must_use]
    pub fn draft(&self) -> &[Part] {
        &self.draft
    }

    /// Committed Parts, in submission order.
    #[must_use]
    pub fn committed(&self) -> &[Part] {
        &self.committed
    }

    /// Parts of one pass.
    #[must_use]
    pub fn parts(&self, pass: Pass) -> &[Part] {
        match pass {
            Pass::Draft => &self.draft,
            Pass::Committed => &self.committed,
        }
    }

    /// Merged coverage (draft and committed) on one line.
    #[must_use]
    pub fn coverage(&self, key: &LineKey) -> Vec<Interval> {
        merge(&self.intervals_on(key), self.config.epsilon_m)
    }

    /// Applies a rectangle in add or erase mode to every line it touches.
    ///
    /// Lines whose bounding box misses the rectangle are never examined.
    pub fn apply_box<P: Projector + ?Sized>(
        &mut self,
        geometry: &GeometryStore,
        projector: &P,
        rect: &SelectionRect,
        mode: SelectionMode,
    ) -> EditReport {
        let bounds = GeoBounds::from_corners(rect.a, rect.b);
        let footprint = BoxFootprint::new(
            projector.project_rect(&rect.a, &rect.b),
            self.config.min_selection_m,
        );

        let mut lines: Vec<&LineData> = geometry.candidates(&bounds).collect();
        lines.sort_by(|x, y| x.key.cmp(&y.key));

        let mut report = EditReport::default();
        for line in lines {
            let raw = footprint.execute(line, projector);
            if raw.is_empty() {
                continue;
            }
            match mode {
                SelectionMode::Add => self.add_on_line(line, &raw, Provenance::Box, &mut report),
                SelectionMode::Erase => self.erase_on_line(line, &raw, &mut report),
            }
        }

        tracing::debug!(
            ?mode,
            added = report.added.len(),
            removed = report.removed.len(),
            skipped = report.skipped.len(),
            "box applied"
        );
        report
    }

    /// Marks a short span around the point of the nearest line to `at`.
    ///
    /// Only the single nearest line within `click_tolerance` is affected.
    pub fn select_click<P: Projector + ?Sized>(
        &mut self,
        geometry: &GeometryStore,
        projector: &P,
        at: LatLng,
    ) -> EditReport {
        let query = ClickFootprint::new(
            at,
            self.config.click_half_width_m,
            self.config.click_tolerance,
        );

        let mut best: Option<(&LineData, ClickHit)> = None;
        for (_, line) in geometry.iter() {
            let Some(hit) = query.execute(line, projector) else {
                continue;
            };
            let closer = best.as_ref().is_none_or(|(held, held_hit)| {
                hit.distance
                    .total_cmp(&held_hit.distance)
                    .then_with(|| line.key.cmp(&held.key))
                    .is_lt()
            });
            if closer {
                best = Some((line, hit));
            }
        }

        let mut report = EditReport::default();
        if let Some((line, hit)) = best {
            tracing::debug!(key = %line.key, at_m = hit.at_m, "click snapped");
            self.add_on_line(line, &[hit.interval], Provenance::Click, &mut report);
        }
        report
    }

    /// Adds an explicit meter range on one line.
    pub fn select_range(&mut self, geometry: &GeometryStore, key: &LineKey, range: Interval) -> EditReport {
        let mut report = EditReport::default();
        match geometry.line(key) {
            Ok(line) => self.add_on_line(line, &[range], Provenance::Box, &mut report),
            Err(err) => {
                tracing::warn!(%key, "range selection on unresolved line");
                report.skip(key, err);
            }
        }
        report
    }

    /// Erases an explicit meter range from the draft of one line.
    pub fn erase_range(&mut self, geometry: &GeometryStore, key: &LineKey, range: Interval) -> EditReport {
        let mut report = EditReport::default();
        match geometry.line(key) {
            Ok(line) => self.erase_on_line(line, &[range], &mut report),
            Err(err) => {
                tracing::warn!(%key, "range erase on unresolved line");
                report.skip(key, err);
            }
        }
        report
    }

    /// Moves every draft Part into the committed set. Returns the moved ids.
    pub fn submit(&mut self) -> Vec<PartId> {
        let moved: Vec<PartId> = self.draft.iter().map(|p| p.id).collect();
        self.committed.append(&mut self.draft);
        tracing::info!(parts = moved.len(), "draft submitted");
        moved
    }

    /// Removes committed Parts by id. This is the only way committed coverage
    /// shrinks. Returns the number removed.
    pub fn remove_committed(&mut self, ids: impl IntoIterator<Item = PartId>) -> usize {
        let ids: HashSet<PartId> = ids.into_iter().collect();
        let before = self.committed.len();
        self.committed.retain(|p| !ids.contains(&p.id));
        before - self.committed.len()
    }

    /// Discards the whole draft.
    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// Replaces the draft wholesale, e.g. from an undo snapshot.
    pub fn restore_draft(&mut self, parts: Vec<Part>) {
        if let Some(max) = parts.iter().map(|p| p.id.0 + 1).max() {
            self.next_id = self.next_id.max(max);
        }
        self.draft = parts;
    }

    /// Sum of `meters × metersMultiplier` over one pass.
    #[must_use]
    pub fn weighted_meters(&self, pass: Pass) -> f64 {
        self.parts(pass).iter().map(Part::weighted_meters).sum()
    }

    /// Weighted meters per segment key over one pass. Parts without a key are
    /// grouped under the empty string.
    #[must_use]
    pub fn meters_by_segment(&self, pass: Pass) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for part in self.parts(pass) {
            let key = part.segment_key.clone().unwrap_or_default();
            *totals.entry(key).or_insert(0.0) += part.weighted_meters();
        }
        totals
    }

    fn intervals_on(&self, key: &LineKey) -> Vec<Interval> {
        self.draft
            .iter()
            .chain(&self.committed)
            .filter(|p| p.is_on(key))
            .map(Part::interval)
            .collect()
    }

    fn add_on_line(&mut self, line: &LineData, raw: &[Interval], provenance: Provenance, report: &mut EditReport) {
        match self.fresh_parts(line, raw, provenance) {
            Ok(fresh) => {
                report.added.extend(fresh.iter().map(|p| p.id));
                self.draft.extend(fresh);
            }
            Err(err) => report.skip(&line.key, err),
        }
    }

    /// Slices the parts of `raw` not yet covered by draft or committed Parts.
    ///
    /// Fresh pieces are stretched over gaps of at most ε to neighbouring
    /// coverage, so the Parts on a line always tile its ε-merged cover.
    fn fresh_parts(
        &mut self,
        line: &LineData,
        raw: &[Interval],
        provenance: Provenance,
    ) -> Result<Vec<Part>, CoverageError> {
        let eps = self.config.epsilon_m;
        let total = line.total_length();
        let existing = self.intervals_on(&line.key);
        let mut covered = existing.clone();
        let mut pieces = Vec::new();

        for iv in raw {
            let target = iv.clamp(0.0, total);
            for piece in subtract(&target, &covered, eps) {
                if piece.length() <= eps {
                    tracing::debug!(key = %line.key, ?piece, "fresh piece below epsilon");
                    continue;
                }
                pieces.push(piece);
                covered.push(piece);
            }
        }
        close_gaps(&mut pieces, &existing, eps);

        pieces
            .into_iter()
            .map(|piece| self.make_part(line, piece, provenance, None))
            .collect()
    }

    fn erase_on_line(&mut self, line: &LineData, footprint: &[Interval], report: &mut EditReport) {
        let eps = self.config.epsilon_m;
        let footprint: Vec<Interval> = merge(footprint, eps)
            .into_iter()
            .filter(|f| f.length() > eps)
            .collect();

        let on_line = |p: &&Part| p.is_on(&line.key);
        let (hit, kept): (Vec<&Part>, Vec<&Part>) = self
            .draft
            .iter()
            .filter(on_line)
            .partition(|p| footprint.iter().any(|f| f.overlaps(&p.interval())));
        let fixed: Vec<Interval> = kept
            .into_iter()
            .chain(self.committed.iter().filter(on_line))
            .map(Part::interval)
            .collect();

        // Remainders of every hit Part, tagged with the index of their source.
        let mut owners = Vec::new();
        let mut rests = Vec::new();
        for (i, part) in hit.iter().enumerate() {
            for rest in subtract(&part.interval(), &footprint, eps) {
                owners.push(i);
                rests.push(rest);
            }
        }
        close_gaps(&mut rests, &fixed, eps);

        let hit: Vec<Part> = hit.into_iter().cloned().collect();
        let mut replacements: Vec<(PartId, Vec<Part>)> = Vec::new();
        for (i, part) in hit.iter().enumerate() {
            let own: Vec<Interval> = owners
                .iter()
                .zip(&rests)
                .filter(|(o, _)| **o == i)
                .map(|(_, r)| *r)
                .collect();
            if own == [part.interval()] {
                continue;
            }
            let mut pieces = Vec::with_capacity(own.len());
            for rest in own {
                match self.make_part(line, rest, Provenance::Split, Some(part)) {
                    Ok(piece) => pieces.push(piece),
                    Err(err) => {
                        report.skip(&line.key, err);
                        return;
                    }
                }
            }
            replacements.push((part.id, pieces));
        }
        if replacements.is_empty() {
            return;
        }

        let mut next = Vec::with_capacity(self.draft.len() + replacements.len());
        for part in self.draft.drain(..) {
            match replacements.iter_mut().find(|(id, _)| *id == part.id) {
                Some((id, pieces)) => {
                    report.removed.push(*id);
                    report.added.extend(pieces.iter().map(|p| p.id));
                    next.append(pieces);
                }
                None => next.push(part),
            }
        }
        self.draft = next;
    }

    /// Materializes one Part. Attributes come from `origin` when re-slicing,
    /// otherwise from the line's metadata.
    fn make_part(
        &mut self,
        line: &LineData,
        range: Interval,
        provenance: Provenance,
        origin: Option<&Part>,
    ) -> Result<Part, CoverageError> {
        let coords = SliceLine::new(range.start, range.end).execute(line)?;
        let (segment_key, meters_multiplier) = match origin {
            Some(p) => (p.segment_key.clone(), p.meters_multiplier),
            None => (line.meta.segment_key.clone(), line.meta.meters_multiplier),
        };
        let id = PartId(self.next_id);
        self.next_id += 1;
        Ok(Part {
            id,
            feature_id: line.key.feature_id.clone(),
            line_index: line.key.line_index,
            start_m: range.start,
            end_m: range.end,
            coords,
            meters: range.length(),
            segment_key,
            meters_multiplier,
            provenance: Some(provenance),
        })
    }
}
