use crate::utils::error::{MapError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Key of one year's records in a finance dataset.
///
/// Finance files write years both as numbers and as strings, so `2009` and
/// `"2009"` deserialize to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Year(String);

impl Year {
    pub fn new(year: impl Into<String>) -> Self {
        Self(year.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Year {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Year::new(deserialize_code(deserializer)?))
    }
}

/// Accepts a JSON string or integer and yields its string form.
pub(crate) fn deserialize_code<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

/// One region's financial figures for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FinanceRecord {
    #[serde(rename = "Code", alias = "OKATO", deserialize_with = "deserialize_code")]
    pub region_code: String,
    #[serde(default)]
    pub receive: f64,
    #[serde(default)]
    pub invest: f64,
    #[serde(default)]
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct YearEntry {
    pub year: Year,
    #[serde(default)]
    pub regions: Vec<FinanceRecord>,
}

/// All yearly finance records, as published in `by-regions.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct YearlyFinanceDataset {
    #[serde(default)]
    pub years: Vec<YearEntry>,
}

impl YearlyFinanceDataset {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Records of `year`. A later entry for the same year shadows an earlier one.
    pub fn records_for(&self, year: &Year) -> Result<&[FinanceRecord]> {
        self.years
            .iter()
            .rev()
            .find(|entry| &entry.year == year)
            .map(|entry| entry.regions.as_slice())
            .ok_or_else(|| MapError::YearNotFound {
                year: year.to_string(),
            })
    }

    pub fn years(&self) -> impl Iterator<Item = &Year> {
        self.years.iter().map(|entry| &entry.year)
    }

    pub fn contains(&self, year: &Year) -> bool {
        self.years().any(|y| y == year)
    }
}

pub type Position = [f64; 2];
pub type Ring = Vec<Position>;

/// Region outline in source coordinates. Projection is left to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    #[serde(skip)]
    Empty,
}

impl Geometry {
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Polygon(rings) => rings.is_empty(),
            Geometry::MultiPolygon(polygons) => polygons.is_empty(),
            Geometry::Empty => true,
        }
    }

    /// GeoJSON geometry object, `null` for an empty shape.
    pub fn to_geojson(&self) -> Result<serde_json::Value> {
        match self {
            Geometry::Empty => Ok(serde_json::Value::Null),
            shape => Ok(serde_json::to_value(shape)?),
        }
    }
}

/// One administrative region as handed over by the geo loader.
#[derive(Debug, Clone)]
pub struct GeoRegion {
    pub region_code: String,
    pub geometry: Arc<Geometry>,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// 8-bit sRGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| MapError::InvalidConfigValueError {
            field: "color".to_string(),
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| invalid("Color must start with '#'"))?;

        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
        };

        match hex.len() {
            6 => match (channel(0..2), channel(2..4), channel(4..6)) {
                (Some(r), Some(g), Some(b)) => Ok(Color::new(r, g, b)),
                _ => Err(invalid("Invalid hex digits")),
            },
            3 => match (channel(0..1), channel(1..2), channel(2..3)) {
                (Some(r), Some(g), Some(b)) => Ok(Color::new(r * 17, g * 17, b * 17)),
                _ => Err(invalid("Invalid hex digits")),
            },
            _ => Err(invalid("Expected #rgb or #rrggbb")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = MapError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Derived numbers attached to a region for one render pass.
///
/// `invest` is shown as a negative magnitude next to `receive`; it is the
/// raw record's value with the sign flipped, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionFigures {
    pub receive: f64,
    pub invest: f64,
    pub delta: f64,
}

/// A region view enriched for one year. Geometry is shared with the loader.
#[derive(Debug, Clone)]
pub struct EnrichedRegion {
    pub region_code: String,
    pub geometry: Arc<Geometry>,
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub figures: RegionFigures,
    pub fill: Color,
    /// `false` when the region had no finance record and the zero default was used.
    pub matched: bool,
}

/// Raw inputs after both loads have completed.
#[derive(Debug, Clone)]
pub struct MapInputs {
    pub regions: Vec<GeoRegion>,
    pub dataset: YearlyFinanceDataset,
}

/// Scale domain stops, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleDomain {
    pub max: f64,
    pub zero: f64,
    pub min: f64,
}

#[derive(Debug, Clone)]
pub struct RenderedYear {
    pub year: Year,
    pub domain: ScaleDomain,
    pub regions: Vec<EnrichedRegion>,
}

impl RenderedYear {
    pub fn unmatched(&self) -> usize {
        self.regions.iter().filter(|r| !r.matched).count()
    }
}

#[derive(Debug, Clone)]
pub struct RenderResult {
    pub region_key: String,
    pub years: Vec<RenderedYear>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_accepts_numbers_and_strings() {
        let dataset: YearlyFinanceDataset = serde_json::from_str(
            r#"{"Years": [
                {"Year": 2009, "Regions": [{"Code": "45", "Receive": 1, "Invest": 2, "Delta": 1}]},
                {"Year": "2010", "Regions": []}
            ]}"#,
        )
        .unwrap();

        assert!(dataset.contains(&Year::from("2009")));
        assert!(dataset.contains(&Year::from("2010")));
        assert_eq!(dataset.records_for(&"2009".into()).unwrap().len(), 1);
    }

    #[test]
    fn test_records_for_unknown_year_fails() {
        let dataset = YearlyFinanceDataset::default();
        let err = dataset.records_for(&"2009".into()).unwrap_err();
        assert!(matches!(err, MapError::YearNotFound { year } if year == "2009"));
    }

    #[test]
    fn test_finance_record_accepts_okato_alias_and_numeric_code() {
        let record: FinanceRecord =
            serde_json::from_str(r#"{"OKATO": 45, "Receive": 100.5, "Invest": 40, "Delta": -60}"#)
                .unwrap();
        assert_eq!(record.region_code, "45");
        assert_eq!(record.receive, 100.5);
        assert_eq!(record.delta, -60.0);
    }

    #[test]
    fn test_color_hex_parsing() {
        assert_eq!("#d73027".parse::<Color>().unwrap(), Color::new(0xd7, 0x30, 0x27));
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::new(255, 255, 255));
        assert!("d73027".parse::<Color>().is_err());
        assert!("#zz3027".parse::<Color>().is_err());
        assert_eq!(Color::new(26, 152, 80).to_string(), "#1a9850");
    }

    #[test]
    fn test_empty_geometry_serializes_as_null() {
        assert_eq!(Geometry::Empty.to_geojson().unwrap(), serde_json::Value::Null);

        let square = Geometry::Polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]);
        let value = square.to_geojson().unwrap();
        assert_eq!(value["type"], "Polygon");
        assert_eq!(value["coordinates"][0][1][0], 1.0);
    }
}
