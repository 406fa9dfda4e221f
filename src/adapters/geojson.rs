use crate::domain::model::{Geometry, Position, Region, Ring};
use crate::utils::error::{DashboardError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::f64::consts::PI;
use std::path::Path;

const EARTH_RADIUS_M: f64 = 6_378_137.0;

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    crs: Option<RawCrs>,
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawCrs {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    // 逐一解析，壞掉的幾何只略過該筆
    geometry: Option<Value>,
}

// 座標可能帶高度（第三個值），先以 Vec<f64> 接收
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum RawGeometry {
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    Wgs84,
    WebMercator,
}

impl Crs {
    /// Accepts `EPSG:4326`, `urn:ogc:def:crs:EPSG::3857`, `urn:ogc:def:crs:OGC:1.3:CRS84`, ...
    pub fn from_name(name: &str) -> Result<Self> {
        let code = name.rsplit(':').next().unwrap_or_default().trim().to_ascii_uppercase();
        match code.as_str() {
            "4326" | "CRS84" => Ok(Crs::Wgs84),
            "3857" | "900913" | "102100" => Ok(Crs::WebMercator),
            _ => Err(DashboardError::UnsupportedCrsError {
                crs: name.to_string(),
            }),
        }
    }

    pub fn to_wgs84(self, position: Position) -> Position {
        match self {
            Crs::Wgs84 => position,
            Crs::WebMercator => {
                let [x, y] = position;
                let lon = (x / EARTH_RADIUS_M).to_degrees();
                let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
                [lon, lat]
            }
        }
    }
}

pub fn read_regions(path: &Path, name_fields: &[String]) -> Result<Vec<Region>> {
    let content = std::fs::read_to_string(path)?;
    parse_regions(&content, &path.display().to_string(), name_fields)
}

/// Parses a FeatureCollection of (Multi)Polygon departments, reprojected to WGS84.
pub fn parse_regions(content: &str, source_path: &str, name_fields: &[String]) -> Result<Vec<Region>> {
    let geometry_error = |message: String| DashboardError::GeometryError {
        source_path: source_path.to_string(),
        message,
    };

    let collection: RawCollection =
        serde_json::from_str(content).map_err(|e| geometry_error(e.to_string()))?;

    if collection.kind != "FeatureCollection" {
        return Err(geometry_error(format!(
            "expected a FeatureCollection, found '{}'",
            collection.kind
        )));
    }

    let crs = match collection
        .crs
        .as_ref()
        .and_then(|c| c.properties.as_ref())
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
    {
        Some(name) => Crs::from_name(name)?,
        None => Crs::Wgs84,
    };
    if crs != Crs::Wgs84 {
        tracing::info!("🌐 Reprojecting boundaries from {:?} to WGS84", crs);
    }

    let mut regions = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let name = match feature
            .properties
            .as_ref()
            .and_then(|props| region_name(props, name_fields))
        {
            Some(name) => name,
            None => {
                tracing::warn!(
                    "⚠️ Feature {} in {} has none of the name properties ({}); skipped",
                    index,
                    source_path,
                    name_fields.join(", ")
                );
                continue;
            }
        };

        let geometry = match feature_geometry(feature.geometry) {
            Ok(geometry) => geometry.map_positions(|p| crs.to_wgs84(p)),
            Err(reason) => {
                tracing::warn!(
                    "⚠️ Feature {} ('{}') in {}: {}; skipped",
                    index,
                    name,
                    source_path,
                    reason
                );
                continue;
            }
        };

        regions.push(Region { name, geometry });
    }

    Ok(regions)
}

fn feature_geometry(value: Option<Value>) -> std::result::Result<Geometry, String> {
    let value = value
        .filter(|v| !v.is_null())
        .ok_or_else(|| "no geometry".to_string())?;
    let raw: RawGeometry = serde_json::from_value(value).map_err(|e| e.to_string())?;
    convert_geometry(raw)
}

fn region_name(properties: &Map<String, Value>, name_fields: &[String]) -> Option<String> {
    name_fields
        .iter()
        .find_map(|field| properties.get(field).and_then(Value::as_str))
        .map(str::to_string)
}

fn convert_ring(ring: Vec<Vec<f64>>) -> std::result::Result<Ring, String> {
    ring.into_iter()
        .map(|coords| match coords.as_slice() {
            [x, y, ..] => Ok([*x, *y]),
            _ => Err(format!("position with {} coordinate(s)", coords.len())),
        })
        .collect()
}

fn convert_polygon(rings: Vec<Vec<Vec<f64>>>) -> std::result::Result<Vec<Ring>, String> {
    rings.into_iter().map(convert_ring).collect()
}

fn convert_geometry(raw: RawGeometry) -> std::result::Result<Geometry, String> {
    Ok(match raw {
        RawGeometry::Polygon(rings) => Geometry::Polygon(convert_polygon(rings)?),
        RawGeometry::MultiPolygon(polygons) => Geometry::MultiPolygon(
            polygons
                .into_iter()
                .map(convert_polygon)
                .collect::<std::result::Result<_, _>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<String> {
        vec!["NOMBRE_DPT".to_string(), "DPTO_CNMBR".to_string()]
    }

    #[test]
    fn test_parse_polygon_and_multipolygon() {
        let content = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"NOMBRE_DPT": "CESAR", "DPTO": "20"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-74.0, 8.0, 120.0], [-73.0, 8.0], [-73.0, 10.0], [-74.0, 8.0]]]}},
                {"type": "Feature", "properties": {"DPTO_CNMBR": "ARCHIPIÉLAGO DE SAN ANDRÉS"},
                 "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[-81.7, 12.5], [-81.6, 12.5], [-81.6, 12.6], [-81.7, 12.5]]],
                    [[[-81.4, 13.3], [-81.3, 13.3], [-81.3, 13.4], [-81.4, 13.3]]]
                 ]}}
            ]
        }"#;

        let regions = parse_regions(content, "test.geo.json", &fields()).unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name, "CESAR");
        assert_eq!(regions[0].geometry.positions().next(), Some(&[-74.0, 8.0]));
        assert_eq!(regions[1].name, "ARCHIPIÉLAGO DE SAN ANDRÉS");
        assert_eq!(regions[1].geometry.polygons().len(), 2);
    }

    #[test]
    fn test_first_configured_name_field_wins() {
        let content = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"DPTO_CNMBR": "SECOND", "NOMBRE_DPT": "FIRST"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 0]]]}}
        ]}"#;

        let regions = parse_regions(content, "test.geo.json", &fields()).unwrap();
        assert_eq!(regions[0].name, "FIRST");
    }

    #[test]
    fn test_feature_without_name_is_skipped() {
        let content = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"NOMBRE_DPT": "CESAR"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 0]]]}},
            {"type": "Feature", "properties": {"NOMBRE_DPT": null},
             "geometry": {"type": "Polygon", "coordinates": [[[2, 2], [3, 2], [2, 2]]]}},
            {"type": "Feature", "properties": null,
             "geometry": {"type": "Polygon", "coordinates": [[[4, 4], [5, 4], [4, 4]]]}}
        ]}"#;

        let regions = parse_regions(content, "test.geo.json", &fields()).unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name, "CESAR");
    }

    #[test]
    fn test_feature_without_usable_geometry_is_skipped() {
        let content = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"NOMBRE_DPT": "SIN GEOMETRIA"}, "geometry": null},
            {"type": "Feature", "properties": {"NOMBRE_DPT": "PUNTO"},
             "geometry": {"type": "Point", "coordinates": [0, 0]}},
            {"type": "Feature", "properties": {"NOMBRE_DPT": "CORTO"},
             "geometry": {"type": "Polygon", "coordinates": [[[0], [1, 0], [0, 0]]]}},
            {"type": "Feature", "properties": {"NOMBRE_DPT": "CESAR"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 0]]]}}
        ]}"#;

        let regions = parse_regions(content, "test.geo.json", &fields()).unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name, "CESAR");
    }

    #[test]
    fn test_not_a_feature_collection() {
        let content = r#"{"type": "Feature", "features": []}"#;
        assert!(parse_regions(content, "test.geo.json", &fields()).is_err());
    }

    #[test]
    fn test_crs_names() {
        assert_eq!(Crs::from_name("EPSG:4326").unwrap(), Crs::Wgs84);
        assert_eq!(Crs::from_name("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(), Crs::Wgs84);
        assert_eq!(Crs::from_name("urn:ogc:def:crs:EPSG::3857").unwrap(), Crs::WebMercator);
        assert!(Crs::from_name("EPSG:3116").is_err());
    }

    #[test]
    fn test_web_mercator_is_reprojected() {
        let content = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}},
            "features": [
                {"type": "Feature", "properties": {"NOMBRE_DPT": "ORIGIN"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [20037508.342789244, 0], [0, 0]]]}}
            ]
        }"#;

        let regions = parse_regions(content, "test.geo.json", &fields()).unwrap();
        let positions: Vec<&Position> = regions[0].geometry.positions().collect();

        assert!(positions[0][0].abs() < 1e-9 && positions[0][1].abs() < 1e-9);
        assert!((positions[1][0] - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_web_mercator_latitude() {
        // 約為波哥大 (-74.08, 4.61)
        let [lon, lat] = Crs::WebMercator.to_wgs84([-8_246_560.0, 513_849.0]);
        assert!((lon + 74.08).abs() < 0.01);
        assert!((lat - 4.61).abs() < 0.01);
    }
}
