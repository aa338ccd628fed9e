use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::LineKey;
use crate::geometry::LatLng;
use crate::math::interval::Interval;

/// Identifier of a Part, unique within one coverage store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(pub u64);

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part-{}", self.0)
    }
}

/// How a Part came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Selected by a rectangle.
    Box,
    /// Selected by a click.
    Click,
    /// Remainder of a Part cut by an erase.
    Split,
}

/// A materialized coverage record for one contiguous sub-range of a line.
///
/// Serializes to the persisted record shape:
/// `{id, fid, lineIndex, startM, endM, coords, meters, segmentKey?, metersMultiplier?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: PartId,
    #[serde(rename = "fid")]
    pub feature_id: String,
    pub line_index: usize,
    pub start_m: f64,
    pub end_m: f64,
    pub coords: Vec<LatLng>,
    pub meters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meters_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl Part {
    /// The line this Part lies on.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.feature_id.clone(), self.line_index)
    }

    /// Returns `true` if this Part lies on `key`.
    #[must_use]
    pub fn is_on(&self, key: &LineKey) -> bool {
        self.line_index == key.line_index && self.feature_id == key.feature_id
    }

    /// The covered meter range.
    #[must_use]
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_m, self.end_m)
    }

    /// Meters scaled by the multiplier (1 when absent).
    #[must_use]
    pub fn weighted_meters(&self) -> f64 {
        self.meters * self.meters_multiplier.unwrap_or(1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Part {
        Part {
            id: PartId(7),
            feature_id: "cable-12".into(),
            line_index: 1,
            start_m: 20.0,
            end_m: 50.0,
            coords: vec![LatLng::new(1.0, 2.0), LatLng::new(1.5, 2.5)],
            meters: 30.0,
            segment_key: Some("INV-3".into()),
            meters_multiplier: None,
            provenance: None,
        }
    }

    #[test]
    fn serializes_to_persisted_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 7,
                "fid": "cable-12",
                "lineIndex": 1,
                "startM": 20.0,
                "endM": 50.0,
                "coords": [[1.0, 2.0], [1.5, 2.5]],
                "meters": 30.0,
                "segmentKey": "INV-3"
            })
        );
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let json = r#"{"id":3,"fid":"t","lineIndex":0,"startM":0,"endM":5,"coords":[[0,0],[0,1]],"meters":5}"#;
        let part: Part = serde_json::from_str(json).unwrap();
        assert_eq!(part.id, PartId(3));
        assert!(part.segment_key.is_none());
        assert!(part.provenance.is_none());
        assert!((part.weighted_meters() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn weighted_meters_applies_multiplier() {
        let part = Part {
            meters_multiplier: Some(3.0),
            ..sample()
        };
        assert!((part.weighted_meters() - 90.0).abs() < 1e-12);
    }

    #[test]
    fn key_matches() {
        let part = sample();
        assert!(part.is_on(&LineKey::new("cable-12", 1)));
        assert!(!part.is_on(&LineKey::new("cable-12", 0)));
        assert_eq!(part.key().to_string(), "cable-12#1");
    }
}
