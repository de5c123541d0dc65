//! Marker quizzes
//!
//! Points are drawn as SVG icons sized and colored per visual state. The
//! correct-answer tooltip carries the details a location table usually
//! has: height, a comment, significance and one configurable extra column.

use std::collections::BTreeMap;

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::data::{QuizItem, csv};

use super::layer::{StyleSheet, VisualState};

/// Size and colors of a marker in one state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerVisual {
    /// Icon width and height in pixels
    pub size: u32,
    /// Fill color
    pub fill: String,
    /// Stroke color
    pub stroke: String,
}

impl MarkerVisual {
    fn new(size: u32, fill: &str, stroke: &str) -> Self {
        Self {
            size,
            fill: fill.to_string(),
            stroke: stroke.to_string(),
        }
    }
}

/// Marker looks for every visual state
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerVisuals(EnumMap<VisualState, MarkerVisual>);

impl Default for MarkerVisuals {
    fn default() -> Self {
        let default = MarkerVisual::new(18, "#0077be", "#004e7c");
        let wrong = MarkerVisual::new(22, "#d33a32", "#8a1f1a");
        Self(EnumMap::from_fn(|state| match state {
            VisualState::Default => default.clone(),
            VisualState::Hover => MarkerVisual::new(22, "#0099ff", "#004e7c"),
            VisualState::Correct => MarkerVisual::new(22, "#1e9d46", "#0e6128"),
            VisualState::Wrong | VisualState::Flash => wrong.clone(),
            VisualState::Target => MarkerVisual::new(26, "#d33a32", "#8a1f1a"),
        }))
    }
}

impl MarkerVisuals {
    /// Completes a partial table
    ///
    /// Missing states use the `default` entry; a missing `flash` entry uses
    /// `wrong` first. Without a `default` entry the built-in looks fill the
    /// gaps.
    pub fn from_partial(partial: &BTreeMap<VisualState, MarkerVisual>) -> Self {
        let builtin = Self::default();
        let fallback = partial
            .get(&VisualState::Default)
            .cloned()
            .unwrap_or_else(|| builtin.0[VisualState::Default].clone());
        Self(EnumMap::from_fn(|state| {
            let inherited = match state {
                VisualState::Flash => partial.get(&VisualState::Wrong),
                _ => None,
            };
            partial
                .get(&state)
                .or(inherited)
                .cloned()
                .unwrap_or_else(|| {
                    if partial.is_empty() {
                        builtin.0[state].clone()
                    } else {
                        fallback.clone()
                    }
                })
        }))
    }

    /// Look of a marker in `state`
    pub fn get(&self, state: VisualState) -> &MarkerVisual {
        &self.0[state]
    }
}

/// SVG markup with `{SIZE}`, `{FILL}` and `{STROKE}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconTemplate(pub String);

impl Default for IconTemplate {
    fn default() -> Self {
        Self(
            r#"<svg width="{SIZE}" height="{SIZE}" viewBox="0 0 24 24" aria-hidden="true"><circle cx="12" cy="12" r="10" fill="{FILL}" stroke="{STROKE}" stroke-width="2"></circle></svg>"#
                .to_string(),
        )
    }
}

impl IconTemplate {
    /// Fills the placeholders with `visual`
    pub fn render(&self, visual: &MarkerVisual) -> String {
        self.0
            .replace("{SIZE}", &visual.size.to_string())
            .replace("{FILL}", &visual.fill)
            .replace("{STROKE}", &visual.stroke)
    }
}

/// What the host needs to draw a marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    /// Icon width and height in pixels
    pub size: u32,
    /// Rendered SVG markup
    pub html: String,
}

/// Style sheet for marker quizzes
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSheet {
    visuals: MarkerVisuals,
    icon: IconTemplate,
    name_properties: Vec<String>,
    extra_label: Option<String>,
}

impl Default for MarkerSheet {
    fn default() -> Self {
        Self::new(MarkerVisuals::default(), IconTemplate::default())
    }
}

impl MarkerSheet {
    /// Sheet drawing `visuals` through `icon`
    pub fn new(visuals: MarkerVisuals, icon: IconTemplate) -> Self {
        Self {
            visuals,
            icon,
            name_properties: vec!["name".to_string()],
            extra_label: None,
        }
    }

    /// Labels the extra tooltip property with a column header
    #[must_use]
    pub fn with_extra_label(mut self, label: impl Into<String>) -> Self {
        self.extra_label = Some(label.into());
        self
    }

    /// Uses different properties for the answer name
    #[must_use]
    pub fn with_name_properties(mut self, properties: Vec<String>) -> Self {
        self.name_properties = properties;
        self
    }

    /// The visuals table in use
    pub fn visuals(&self) -> &MarkerVisuals {
        &self.visuals
    }
}

impl StyleSheet for MarkerSheet {
    type Style = MarkerStyle;

    fn style(&self, state: VisualState) -> MarkerStyle {
        let visual = self.visuals.get(state);
        MarkerStyle {
            size: visual.size,
            html: self.icon.render(visual),
        }
    }

    fn name_properties(&self) -> &[String] {
        &self.name_properties
    }

    fn describe(&self, item: &QuizItem) -> String {
        let mut lines = vec![match item.property("Height_m") {
            Some(height) => format!("{} ({height} m)", self.extract_name(item)),
            None => self.extract_name(item),
        }];
        if let Some(extra) = item.property(csv::EXTRA_PROPERTY) {
            lines.push(match &self.extra_label {
                Some(label) => format!("{label}: {extra}"),
                None => extra.to_string(),
            });
        }
        lines.extend(
            [csv::COMMENT_PROPERTY, "Significance"]
                .into_iter()
                .filter_map(|key| item.property(key))
                .map(str::to_string),
        );
        lines.join("\n")
    }

    fn feedback_color(&self) -> Option<&str> {
        Some(&self.visuals.get(VisualState::Target).fill)
    }

    fn locate_hint(&self) -> &str {
        "Click the highlighted marker to continue"
    }
}
