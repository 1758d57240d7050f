//! Turns a TopoJSON topology (or a GeoJSON feature collection) into
//! [`GeoRegion`]s keyed by a region-code property.

use crate::domain::model::{deserialize_code, GeoRegion, Geometry, Position, Ring};
use crate::utils::error::{MapError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: HashMap<String, TopoObject>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct TopoObject {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    geometries: Vec<TopoObject>,
    #[serde(default)]
    arcs: Value,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

fn geo_error(message: impl Into<String>) -> MapError {
    MapError::GeoFormat {
        message: message.into(),
    }
}

/// Parses topology or GeoJSON bytes into regions.
///
/// `object_name` selects the collection inside a topology and is ignored for
/// GeoJSON input. Every region must carry `region_key` in its properties.
pub fn regions_from_slice(
    bytes: &[u8],
    object_name: &str,
    region_key: &str,
) -> Result<Vec<GeoRegion>> {
    let document: Value = serde_json::from_slice(bytes)?;
    let kind = document
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let regions = match kind.as_str() {
        "Topology" => {
            let topology: Topology = serde_json::from_value(document)?;
            topology.regions(object_name, region_key)?
        }
        "FeatureCollection" => {
            let collection: FeatureCollection = serde_json::from_value(document)?;
            collection
                .features
                .into_iter()
                .map(|feature| {
                    let geometry = match feature.geometry {
                        None | Some(Value::Null) => Geometry::Empty,
                        Some(value) => serde_json::from_value(value)
                            .map_err(|e| geo_error(format!("Unsupported geometry: {}", e)))?,
                    };
                    region(feature.properties.unwrap_or_default(), geometry, region_key)
                })
                .collect::<Result<Vec<_>>>()?
        }
        other => return Err(geo_error(format!("Unsupported document type '{}'", other))),
    };

    warn_duplicate_codes(&regions);
    tracing::debug!("Decoded {} regions from geo data", regions.len());
    Ok(regions)
}

fn region(properties: Map<String, Value>, geometry: Geometry, region_key: &str) -> Result<GeoRegion> {
    let code = properties
        .get(region_key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| geo_error(format!("Region without '{}' property", region_key)))?;
    let region_code = deserialize_code(code.clone())
        .map_err(|e| geo_error(format!("Invalid '{}' value: {}", region_key, e)))?;

    Ok(GeoRegion {
        region_code,
        geometry: Arc::new(geometry),
        properties,
    })
}

fn warn_duplicate_codes(regions: &[GeoRegion]) {
    let mut seen = HashSet::new();
    for region in regions {
        if !seen.insert(region.region_code.as_str()) {
            tracing::warn!("Duplicate region code {} in geo data", region.region_code);
        }
    }
}

impl Topology {
    fn regions(&self, object_name: &str, region_key: &str) -> Result<Vec<GeoRegion>> {
        let object = self
            .objects
            .get(object_name)
            .ok_or_else(|| geo_error(format!("Topology has no object '{}'", object_name)))?;

        let arcs = self.decode_arcs();
        let members: Vec<&TopoObject> = if object.kind.as_deref() == Some("GeometryCollection") {
            object.geometries.iter().collect()
        } else {
            vec![object]
        };

        members
            .into_iter()
            .map(|member| {
                let geometry = member.geometry(&arcs)?;
                region(member.properties.clone().unwrap_or_default(), geometry, region_key)
            })
            .collect()
    }

    /// Absolute positions for every arc, undoing quantization when present.
    fn decode_arcs(&self) -> Vec<Vec<Position>> {
        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| match self.transform {
                        Some(t) => {
                            x += p[0];
                            y += p[1];
                            [x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1]]
                        }
                        None => [p[0], p[1]],
                    })
                    .collect()
            })
            .collect()
    }
}

impl TopoObject {
    fn geometry(&self, arcs: &[Vec<Position>]) -> Result<Geometry> {
        match self.kind.as_deref() {
            None => Ok(Geometry::Empty),
            Some("Polygon") => {
                let rings: Vec<Vec<i64>> = serde_json::from_value(self.arcs.clone())?;
                Ok(Geometry::Polygon(polygon(&rings, arcs)?))
            }
            Some("MultiPolygon") => {
                let polygons: Vec<Vec<Vec<i64>>> = serde_json::from_value(self.arcs.clone())?;
                Ok(Geometry::MultiPolygon(
                    polygons
                        .iter()
                        .map(|rings| polygon(rings, arcs))
                        .collect::<Result<Vec<_>>>()?,
                ))
            }
            Some(other) => Err(geo_error(format!("Unsupported region geometry '{}'", other))),
        }
    }
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Position>]) -> Result<Vec<Ring>> {
    rings.iter().map(|indexes| ring(indexes, arcs)).collect()
}

/// Stitches arcs into a closed ring. Negative index `!i` walks arc `i` backwards.
fn ring(indexes: &[i64], arcs: &[Vec<Position>]) -> Result<Ring> {
    let mut points: Ring = Vec::new();
    for &index in indexes {
        let (arc_index, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(arc_index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or_else(|| geo_error(format!("Arc index {} out of range", index)))?;

        // shared endpoint with the previous arc
        points.pop();
        let start = points.len();
        points.extend_from_slice(arc);
        if reversed {
            points[start..].reverse();
        }
    }

    if let Some(&first) = points.first() {
        while points.len() < 4 {
            points.push(first);
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [0.5, 2.0], "translate": [10.0, 20.0]},
        "arcs": [
            [[0, 0], [2, 0], [0, 1]],
            [[2, 1], [-2, 0], [0, -1]],
            [[4, 4], [1, 0], [0, 1], [-1, 0]]
        ],
        "objects": {
            "regions": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1]], "properties": {"OKATO": "45", "name": "A"}},
                    {"type": "MultiPolygon", "arcs": [[[-3]]], "properties": {"OKATO": 46}},
                    {"type": null, "properties": {"OKATO": "47"}}
                ]
            }
        }
    }"#;

    #[test]
    fn test_topology_decodes_quantized_arcs() {
        let regions = regions_from_slice(TOPOLOGY.as_bytes(), "regions", "OKATO").unwrap();
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].region_code, "45");
        assert_eq!(regions[0].properties["name"], "A");

        match regions[0].geometry.as_ref() {
            Geometry::Polygon(rings) => {
                assert_eq!(
                    rings[0],
                    vec![[10.0, 20.0], [11.0, 20.0], [11.0, 22.0], [10.0, 22.0], [10.0, 20.0]]
                );
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_arc_index_reverses_arc() {
        let regions = regions_from_slice(TOPOLOGY.as_bytes(), "regions", "OKATO").unwrap();
        assert_eq!(regions[1].region_code, "46");

        match regions[1].geometry.as_ref() {
            Geometry::MultiPolygon(polygons) => {
                let ring = &polygons[0][0];
                assert_eq!(ring.first(), Some(&[12.0, 30.0]));
                assert_eq!(ring.last(), Some(&[12.0, 28.0]));
                assert_eq!(ring.len(), 4);
            }
            other => panic!("expected multipolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_null_geometry_is_empty() {
        let regions = regions_from_slice(TOPOLOGY.as_bytes(), "regions", "OKATO").unwrap();
        assert!(regions[2].geometry.is_empty());
    }

    #[test]
    fn test_missing_object_is_an_error() {
        let err = regions_from_slice(TOPOLOGY.as_bytes(), "countries", "OKATO").unwrap_err();
        assert!(matches!(err, MapError::GeoFormat { .. }));
    }

    #[test]
    fn test_missing_region_key_is_an_error() {
        let err = regions_from_slice(TOPOLOGY.as_bytes(), "regions", "CODE").unwrap_err();
        assert!(err.to_string().contains("CODE"));
    }

    #[test]
    fn test_ring_is_padded_to_four_positions() {
        let arcs = vec![vec![[0.0, 0.0], [1.0, 1.0]]];
        let ring = ring(&[0], &arcs).unwrap();
        assert_eq!(ring, vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_feature_collection_input() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"OKATO": "45"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
                {"type": "Feature", "properties": {"OKATO": "46"}, "geometry": null}
            ]
        }"#;
        let regions = regions_from_slice(geojson.as_bytes(), "ignored", "OKATO").unwrap();
        assert_eq!(regions.len(), 2);
        assert!(matches!(regions[0].geometry.as_ref(), Geometry::Polygon(r) if r[0].len() == 4));
        assert!(regions[1].geometry.is_empty());
    }

    #[test]
    fn test_unsupported_document_type() {
        let err = regions_from_slice(br#"{"type": "Point"}"#, "regions", "OKATO").unwrap_err();
        assert!(matches!(err, MapError::GeoFormat { .. }));
    }
}
