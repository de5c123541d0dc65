//! District quizzes

use enum_map::EnumMap;

use super::layer::{PathStyle, StyleSheet, VisualState};

/// Style sheet for polygon quizzes
///
/// Judgement is shown through the fill; the reveal target keeps the
/// resting fill and gets a heavy blue outline instead.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonSheet {
    styles: EnumMap<VisualState, PathStyle>,
    name_properties: Vec<String>,
}

impl Default for PolygonSheet {
    fn default() -> Self {
        Self::new(PathStyle {
            color: "#2e5090".to_string(),
            weight: 2.,
            opacity: None,
            fill_color: Some("#87ceeb".to_string()),
            fill_opacity: Some(0.6),
        })
    }
}

impl PolygonSheet {
    /// Sheet deriving every state from a resting style
    pub fn new(base: PathStyle) -> Self {
        let styles = EnumMap::from_fn(|state| match state {
            VisualState::Default => base.clone(),
            VisualState::Hover => base.clone().weight(3.).fill_opacity(0.8),
            VisualState::Correct => base.clone().weight(3.).fill("green"),
            VisualState::Wrong => base.clone().weight(3.).fill("red"),
            VisualState::Flash => base.clone().fill("red"),
            VisualState::Target => base.clone().weight(4.).color("#2a7fff"),
        });
        Self {
            styles,
            name_properties: vec!["DISTRICT".to_string(), "district".to_string()],
        }
    }

    /// Uses different properties for the answer name
    #[must_use]
    pub fn with_name_properties(mut self, properties: Vec<String>) -> Self {
        self.name_properties = properties;
        self
    }
}

impl StyleSheet for PolygonSheet {
    type Style = PathStyle;

    fn style(&self, state: VisualState) -> PathStyle {
        self.styles[state].clone()
    }

    fn name_properties(&self) -> &[String] {
        &self.name_properties
    }

    fn locate_hint(&self) -> &str {
        "click the correct district to continue"
    }
}
