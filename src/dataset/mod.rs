use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::error::{CoverageError, GeometryError};
use crate::geometry::{flatten, CumulativeTable, GeoBounds, LineGeometry, Polyline};

slotmap::new_key_type! {
    /// Unique identifier for a loaded line in the geometry store.
    ///
    /// Generational: ids from before a [`GeometryStore::clear`] never resolve
    /// to lines loaded afterwards.
    pub struct LineId;
}

/// Stable external identity of one simple polyline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineKey {
    pub feature_id: String,
    pub line_index: usize,
}

impl LineKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(feature_id: impl Into<String>, line_index: usize) -> Self {
        Self {
            feature_id: feature_id.into(),
            line_index,
        }
    }

    /// The error reported when this key no longer resolves.
    #[must_use]
    pub fn missing(&self) -> CoverageError {
        CoverageError::GeometryMissing {
            feature_id: self.feature_id.clone(),
            line_index: self.line_index,
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.feature_id, self.line_index)
    }
}

/// Per-feature attributes copied onto every Part made from its lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMeta {
    /// Grouping key for progress counters (cable route, trench run, ...).
    pub segment_key: Option<String>,
    /// Weight applied to Part meters when aggregating (e.g. cables per trench).
    pub meters_multiplier: Option<f64>,
}

/// A loaded polyline with its cached derived data.
#[derive(Debug, Clone)]
pub struct LineData {
    pub key: LineKey,
    pub polyline: Polyline,
    pub table: CumulativeTable,
    pub meta: LineMeta,
}

impl LineData {
    /// Total length in meters.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.table.total_length()
    }
}

/// Arena owning every polyline of the loaded dataset.
///
/// Created on dataset load and cleared on module or dataset switch. Lines are
/// immutable for the life of the load.
#[derive(Debug, Default)]
pub struct GeometryStore {
    lines: SlotMap<LineId, LineData>,
    index: HashMap<LineKey, LineId>,
    features: HashMap<String, Vec<LineId>>,
}

impl GeometryStore {
    /// Creates a new, empty geometry store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens and loads all lines of one feature.
    ///
    /// Lines with fewer than 2 valid vertices are skipped without shifting
    /// the `line_index` of their siblings. Returns the ids of the loaded lines.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::DuplicateFeature` if the feature is already
    /// loaded.
    pub fn load_feature(
        &mut self,
        feature_id: impl Into<String>,
        geometry: &LineGeometry,
        meta: &LineMeta,
    ) -> Result<Vec<LineId>, GeometryError> {
        let feature_id = feature_id.into();
        if self.features.contains_key(&feature_id) {
            return Err(GeometryError::DuplicateFeature(feature_id));
        }

        let mut ids = Vec::new();
        for (line_index, vertices) in flatten(geometry).into_iter().enumerate() {
            let key = LineKey::new(feature_id.clone(), line_index);
            let polyline = match Polyline::new(vertices) {
                Ok(polyline) => polyline,
                Err(err) => {
                    tracing::debug!(%key, %err, "skipping unusable line");
                    continue;
                }
            };
            let table = CumulativeTable::build(polyline.vertices());
            let id = self.lines.insert(LineData {
                key: key.clone(),
                polyline,
                table,
                meta: meta.clone(),
            });
            self.index.insert(key, id);
            ids.push(id);
        }

        self.features.insert(feature_id, ids.clone());
        Ok(ids)
    }

    /// Removes a feature and all its lines. Returns `false` if it was not loaded.
    pub fn remove_feature(&mut self, feature_id: &str) -> bool {
        let Some(ids) = self.features.remove(feature_id) else {
            return false;
        };
        for id in ids {
            if let Some(data) = self.lines.remove(id) {
                self.index.remove(&data.key);
            }
        }
        true
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.index.clear();
        self.features.clear();
    }

    /// Resolves a key to its current id.
    ///
    /// # Errors
    ///
    /// Returns `CoverageError::GeometryMissing` if the key is not loaded.
    pub fn resolve(&self, key: &LineKey) -> Result<LineId, CoverageError> {
        self.index.get(key).copied().ok_or_else(|| key.missing())
    }

    /// Returns the line for `key`.
    ///
    /// # Errors
    ///
    /// Returns `CoverageError::GeometryMissing` if the key is not loaded.
    pub fn line(&self, key: &LineKey) -> Result<&LineData, CoverageError> {
        self.resolve(key)
            .and_then(|id| self.lines.get(id).ok_or_else(|| key.missing()))
    }

    /// Returns the line for `id`, or `None` if it is stale.
    #[must_use]
    pub fn get(&self, id: LineId) -> Option<&LineData> {
        self.lines.get(id)
    }

    /// Lines whose bounding box intersects `bounds`, in unspecified order.
    pub fn candidates<'a>(&'a self, bounds: &'a GeoBounds) -> impl Iterator<Item = &'a LineData> + 'a {
        self.lines
            .values()
            .filter(move |data| data.polyline.bounds().intersects(bounds))
    }

    /// Iterates every loaded line.
    pub fn iter(&self) -> impl Iterator<Item = (LineId, &LineData)> {
        self.lines.iter()
    }

    /// Number of loaded lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if no lines are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
