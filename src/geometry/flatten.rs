use serde::Deserialize;

use super::latlng::LatLng;

/// Line geometry as it arrives from a dataset or the renderer.
///
/// Accepts GeoJSON `LineString` / `MultiLineString` objects (positions are
/// `[lng, lat, ...]`) and renderer-style nested arrays of any depth (positions
/// are `[lat, lng]` or `{ "lat": .., "lng": .. }`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LineGeometry {
    GeoJson(GeoJsonLine),
    Nested(NestedCoords),
}

/// GeoJSON line geometry object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonLine {
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
}

/// Renderer-style nested coordinate arrays.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NestedCoords {
    Object { lat: f64, lng: f64 },
    Position(Vec<f64>),
    Nested(Vec<NestedCoords>),
}

impl NestedCoords {
    fn as_position(&self) -> Option<Option<LatLng>> {
        match self {
            Self::Object { lat, lng } => Some(Some(LatLng::new(*lat, *lng))),
            Self::Position(p) => Some(lat_lng_position(p)),
            Self::Nested(_) => None,
        }
    }
}

impl LineGeometry {
    /// Builds a GeoJSON `LineString` from geographic vertices.
    #[must_use]
    pub fn line_string(vertices: &[LatLng]) -> Self {
        Self::GeoJson(GeoJsonLine::LineString {
            coordinates: vertices.iter().map(|v| vec![v.lng, v.lat]).collect(),
        })
    }

    /// Builds a GeoJSON `MultiLineString` from geographic vertex lists.
    #[must_use]
    pub fn multi_line_string(lines: &[Vec<LatLng>]) -> Self {
        Self::GeoJson(GeoJsonLine::MultiLineString {
            coordinates: lines
                .iter()
                .map(|line| line.iter().map(|v| vec![v.lng, v.lat]).collect())
                .collect(),
        })
    }
}

/// Flattens any supported shape into its canonical ordered list of simple
/// polylines.
///
/// The position of each entry in the result is its `line_index`. Entries are
/// emitted depth-first in source order; a run of sibling positions forms one
/// polyline. Malformed positions are dropped from their polyline, and
/// polylines with fewer than 2 vertices are still emitted so that indices
/// never shift when a sibling is degenerate.
#[must_use]
pub fn flatten(geometry: &LineGeometry) -> Vec<Vec<LatLng>> {
    let mut out = Vec::new();
    match geometry {
        LineGeometry::GeoJson(GeoJsonLine::LineString { coordinates }) => {
            out.push(coordinates.iter().filter_map(|p| lng_lat_position(p)).collect());
        }
        LineGeometry::GeoJson(GeoJsonLine::MultiLineString { coordinates }) => {
            for line in coordinates {
                out.push(line.iter().filter_map(|p| lng_lat_position(p)).collect());
            }
        }
        LineGeometry::Nested(nested) => flatten_nested(nested, &mut out),
    }
    out
}

fn flatten_nested(node: &NestedCoords, out: &mut Vec<Vec<LatLng>>) {
    let NestedCoords::Nested(children) = node else {
        // A bare position is a one-vertex line.
        out.push(node.as_position().flatten().into_iter().collect());
        return;
    };

    let mut run: Option<Vec<LatLng>> = None;
    for child in children {
        if let Some(position) = child.as_position() {
            let line = run.get_or_insert_with(Vec::new);
            line.extend(position);
        } else {
            if let Some(line) = run.take() {
                out.push(line);
            }
            flatten_nested(child, out);
        }
    }
    if let Some(line) = run {
        out.push(line);
    }
}

fn lng_lat_position(p: &[f64]) -> Option<LatLng> {
    match p {
        [lng, lat, ..] => Some(LatLng::new(*lat, *lng)),
        _ => None,
    }
}

fn lat_lng_position(p: &[f64]) -> Option<LatLng> {
    match p {
        [lat, lng, ..] => Some(LatLng::new(*lat, *lng)),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> LineGeometry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn geojson_line_string_swaps_axis_order() {
        let g = parse(r#"{"type":"LineString","coordinates":[[10.0,50.0],[10.1,50.1,3.0]]}"#);
        let lines = flatten(&g);
        assert_eq!(lines, vec![vec![LatLng::new(50.0, 10.0), LatLng::new(50.1, 10.1)]]);
    }

    #[test]
    fn geojson_multi_line_string_keeps_order() {
        let g = parse(
            r#"{"type":"MultiLineString","coordinates":[[[0,0],[1,0]],[[2,0],[3,0]],[[4,0]]]}"#,
        );
        let lines = flatten(&g);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1][0], LatLng::new(0.0, 2.0));
        // Degenerate third line keeps its slot.
        assert_eq!(lines[2].len(), 1);
    }

    #[test]
    fn nested_renderer_arrays_are_lat_lng() {
        let g = parse("[[1.0, 2.0], [3.0, 4.0]]");
        assert_eq!(flatten(&g), vec![vec![LatLng::new(1.0, 2.0), LatLng::new(3.0, 4.0)]]);
    }

    #[test]
    fn deeply_nested_arrays_flatten_depth_first() {
        let g = parse(r#"[[[[0,0],[0,1]],[[1,0],[1,1]]],[[{"lat":2,"lng":0},{"lat":2,"lng":1}]]]"#);
        let lines = flatten(&g);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0][1], LatLng::new(0.0, 1.0));
        assert_eq!(lines[1][0], LatLng::new(1.0, 0.0));
        assert_eq!(lines[2][0], LatLng::new(2.0, 0.0));
    }

    #[test]
    fn mixed_children_split_into_runs() {
        let g = parse("[[0,0],[0,1],[[5,5],[5,6]],[0,2],[0,3]]");
        let lines = flatten(&g);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1][0], LatLng::new(5.0, 5.0));
        assert_eq!(lines[2][1], LatLng::new(0.0, 3.0));
    }

    #[test]
    fn constructors_round_trip_through_flatten() {
        let a = vec![LatLng::new(1.0, 2.0), LatLng::new(3.0, 4.0)];
        assert_eq!(flatten(&LineGeometry::line_string(&a)), vec![a.clone()]);
        assert_eq!(
            flatten(&LineGeometry::multi_line_string(&[a.clone(), a.clone()])),
            vec![a.clone(), a]
        );
    }
}
