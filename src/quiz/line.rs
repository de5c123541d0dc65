//! River quizzes
//!
//! Lines keep a thin resting stroke and thicken when hovered, judged or
//! revealed.

use enum_map::EnumMap;

use super::layer::{PathStyle, StyleSheet, VisualState};

/// Style sheet for line quizzes
#[derive(Debug, Clone, PartialEq)]
pub struct LineSheet {
    styles: EnumMap<VisualState, PathStyle>,
    name_properties: Vec<String>,
}

impl Default for LineSheet {
    fn default() -> Self {
        Self::new(PathStyle {
            color: "#00008B".to_string(),
            weight: 1.5,
            opacity: Some(0.8),
            fill_color: None,
            fill_opacity: None,
        })
    }
}

impl LineSheet {
    /// Sheet deriving every state from a resting style
    pub fn new(base: PathStyle) -> Self {
        let styles = EnumMap::from_fn(|state| match state {
            VisualState::Default => base.clone(),
            VisualState::Hover => base.clone().weight(5.).color("#003399"),
            VisualState::Correct => base.clone().weight(5.).color("green"),
            VisualState::Wrong => base.clone().weight(5.).color("red"),
            VisualState::Flash => base.clone().color("red"),
            VisualState::Target => base.clone().weight(6.).color("#2a7fff"),
        });
        Self {
            styles,
            name_properties: vec!["rivname".to_string(), "name".to_string()],
        }
    }

    /// Uses different properties for the answer name
    #[must_use]
    pub fn with_name_properties(mut self, properties: Vec<String>) -> Self {
        self.name_properties = properties;
        self
    }
}

impl StyleSheet for LineSheet {
    type Style = PathStyle;

    fn style(&self, state: VisualState) -> PathStyle {
        self.styles[state].clone()
    }

    fn name_properties(&self) -> &[String] {
        &self.name_properties
    }

    fn locate_hint(&self) -> &str {
        "click the correct river to continue"
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        data::{Geometry, Position, QuizItem},
        quiz::layer::{EntityAdapter, EntityId, Layer},
    };

    fn river(properties: &[(&str, &str)]) -> QuizItem {
        properties.iter().fold(
            QuizItem::new(
                "unnamed",
                Geometry::LineString(vec![Position::new(0., 0.), Position::new(1., 1.)]),
            ),
            |item, (k, v)| item.with_property(*k, *v),
        )
    }

    #[test]
    fn test_states_keep_base_opacity() {
        let sheet = LineSheet::default();
        let target = sheet.style(VisualState::Target);
        assert_eq!(target.weight, 6.);
        assert_eq!(target.color, "#2a7fff");
        assert_eq!(target.opacity, Some(0.8));
        assert_eq!(sheet.style(VisualState::Flash).weight, 1.5);
    }

    #[test]
    fn test_name_fallback_order() {
        let layer = Layer::new(
            LineSheet::default(),
            [
                river(&[("rivname", "Ganga"), ("name", "Ganges")]),
                river(&[("name", "Danube")]),
            ],
        );
        assert_eq!(layer.extract_name(EntityId(0)), Some("Ganga"));
        assert_eq!(layer.extract_name(EntityId(1)), Some("Danube"));
        assert_eq!(layer.feedback_anchor(EntityId(0)), None);
        assert_eq!(layer.locate_hint(), "click the correct river to continue");
    }
}
