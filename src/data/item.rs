//! Quiz items and their geometry

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A longitude/latitude pair
///
/// Serialized the GeoJSON way, as `[lng, lat]`. Extra ordinates such as
/// altitude are accepted and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    /// Longitude in degrees
    pub lng: f64,
    /// Latitude in degrees
    pub lat: f64,
}

impl Position {
    /// Creates a position from latitude and longitude, in that order
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lng, lat }
    }

    /// Whether both ordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [lng, lat, ..] => Ok(Self {
                lng: *lng,
                lat: *lat,
            }),
            _ => Err(format!("position needs two ordinates, got {}", value.len())),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        [position.lng, position.lat]
    }
}

/// Shape of a quiz item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// A single location, drawn as a marker
    Point(Position),
    /// A polyline, e.g. a river
    LineString(Vec<Position>),
    /// Several polylines sharing one name
    MultiLineString(Vec<Vec<Position>>),
    /// An outer ring followed by holes
    Polygon(Vec<Vec<Position>>),
    /// Several polygons sharing one name
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl Geometry {
    /// A representative location for feedback effects
    ///
    /// Points use themselves, lines their middle vertex and polygons the
    /// vertex average of their first outer ring.
    pub fn anchor(&self) -> Option<Position> {
        match self {
            Self::Point(position) => Some(*position),
            Self::LineString(line) => middle(line),
            Self::MultiLineString(lines) => lines.iter().find_map(|line| middle(line)),
            Self::Polygon(rings) => rings.first().and_then(|ring| average(ring)),
            Self::MultiPolygon(polygons) => polygons
                .iter()
                .find_map(|rings| rings.first().and_then(|ring| average(ring))),
        }
    }
}

fn middle(line: &[Position]) -> Option<Position> {
    line.get(line.len() / 2).copied()
}

fn average(ring: &[Position]) -> Option<Position> {
    if ring.is_empty() {
        return None;
    }
    let count = ring.len() as f64;
    let (lng, lat) = ring
        .iter()
        .fold((0., 0.), |(lng, lat), p| (lng + p.lng, lat + p.lat));
    Some(Position {
        lng: lng / count,
        lat: lat / count,
    })
}

/// A named entity the player has to find on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
    /// Display name, which is also the answer key
    pub name: String,
    /// Where the item is drawn
    pub geometry: Geometry,
    /// Extra attributes shown in tooltips
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl QuizItem {
    /// Creates an item without extra properties
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
            properties: BTreeMap::new(),
        }
    }

    /// Convenience constructor for a point item
    pub fn point(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self::new(name, Geometry::Point(Position::new(lat, lng)))
    }

    /// Adds a property, builder style
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Looks a property up, treating empty values as absent
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}
