//! GeoJSON input for line and polygon quizzes
//!
//! Only the parts of GeoJSON that quizzes need are modelled: a
//! FeatureCollection whose features carry a geometry and flat properties.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

use super::item::{Geometry, QuizItem};

/// A GeoJSON FeatureCollection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// The features in file order
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A single GeoJSON feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Geometry, absent for attribute-only features
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// Free-form attributes
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    /// The first non-empty value among `names`, rendered as trimmed text
    pub fn name(&self, names: &[impl AsRef<str>]) -> Option<String> {
        let properties = self.properties.as_ref()?;
        names.iter().find_map(|key| {
            properties
                .get(key.as_ref())
                .and_then(value_text)
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        })
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses a FeatureCollection from text
///
/// # Errors
///
/// Returns [`crate::Error::Json`] when the text is not a FeatureCollection.
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    Ok(serde_json::from_str(text)?)
}

/// Keeps the features whose `property` equals `value`
///
/// Values are compared as text; with `case_sensitive` unset both sides are
/// lowercased first.
pub fn filter_by_property(
    collection: &FeatureCollection,
    property: &str,
    value: &str,
    case_sensitive: bool,
) -> FeatureCollection {
    let normalize = |text: String| {
        if case_sensitive {
            text
        } else {
            text.to_lowercase()
        }
    };
    let wanted = normalize(value.to_string());

    FeatureCollection {
        features: collection
            .features
            .iter()
            .filter(|feature| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|properties| properties.get(property))
                    .and_then(value_text)
                    .is_some_and(|text| normalize(text) == wanted)
            })
            .cloned()
            .collect(),
    }
}

/// Names of all features, trying each property of `names` in order
pub fn extract_names(collection: &FeatureCollection, names: &[impl AsRef<str>]) -> Vec<String> {
    collection
        .features
        .iter()
        .filter_map(|feature| feature.name(names))
        .collect()
}

/// Converts features into quiz items
///
/// Features without a geometry or without any of the `names` properties are
/// dropped. Scalar properties are kept as text.
pub fn to_items(collection: &FeatureCollection, names: &[impl AsRef<str>]) -> Vec<QuizItem> {
    let items = collection
        .features
        .iter()
        .filter_map(|feature| {
            let name = feature.name(names)?;
            let geometry = feature.geometry.clone()?;
            let properties = feature
                .properties
                .iter()
                .flatten()
                .filter_map(|(key, value)| value_text(value).map(|text| (key.clone(), text)))
                .collect();
            Some(QuizItem {
                name,
                geometry,
                properties,
            })
        })
        .collect_vec();

    if items.len() < collection.features.len() {
        tracing::warn!(
            kept = items.len(),
            dropped = collection.features.len() - items.len(),
            "geojson features without name or geometry dropped"
        );
    }

    items
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::data::item::Position;

    const RIVERS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"rivname": "Ganga", "continent": "Asia", "length_km": 2525},
             "geometry": {"type": "LineString", "coordinates": [[78.0, 30.0], [83.0, 25.3], [88.1, 22.0]]}},
            {"type": "Feature", "properties": {"name": "Danube", "continent": "EUROPE"},
             "geometry": {"type": "LineString", "coordinates": [[8.2, 48.0], [29.7, 45.2]]}},
            {"type": "Feature", "properties": {"rivname": "  "},
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}},
            {"type": "Feature", "properties": {"rivname": "Ghost"}, "geometry": null}
        ]
    }"#;

    #[test]
    fn test_parse_and_convert() {
        let collection = parse_feature_collection(RIVERS).unwrap();
        let items = to_items(&collection, &["rivname", "name"]);

        assert_eq!(
            items.iter().map(|i| i.name.as_str()).collect_vec(),
            ["Ganga", "Danube"]
        );
        assert_eq!(items[0].property("length_km"), Some("2525"));
        assert_eq!(items[0].geometry.anchor(), Some(Position::new(25.3, 83.0)));
    }

    #[test]
    fn test_extract_names_fallback_order() {
        let collection = parse_feature_collection(RIVERS).unwrap();
        assert_eq!(
            extract_names(&collection, &["name", "rivname"]),
            ["Ganga", "Danube", "Ghost"]
        );
    }

    #[test]
    fn test_filter_by_property_case_insensitive() {
        let collection = parse_feature_collection(RIVERS).unwrap();

        let europe = filter_by_property(&collection, "continent", "Europe", false);
        assert_eq!(europe.features.len(), 1);

        let strict = filter_by_property(&collection, "continent", "Europe", true);
        assert!(strict.features.is_empty());
    }

    #[test]
    fn test_filter_numeric_property() {
        let collection = parse_feature_collection(RIVERS).unwrap();
        let long = filter_by_property(&collection, "length_km", "2525", true);
        assert_eq!(long.features.len(), 1);
    }

    #[test]
    fn test_malformed_geojson() {
        assert!(parse_feature_collection("{\"features\": 3}").is_err());
        assert!(parse_feature_collection("not json").is_err());
    }
}
