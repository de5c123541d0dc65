//! Rendered entities and the adapter seam of the state machine
//!
//! The state machine only knows entities by [`EntityId`]. An
//! [`EntityAdapter`] tells it which name an entity answers to, restyles it
//! and finds the entity for a given answer. [`Layer`] is the one adapter
//! implementation; the point, line and polygon quizzes differ only in the
//! [`StyleSheet`] they plug into it.

use std::fmt::Debug;

use derive_where::derive_where;
use enum_map::Enum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    constants,
    data::{Position, QuizItem},
};

/// Index of a rendered entity within its layer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub struct EntityId(pub usize);

/// Visual states an entity can be drawn in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Enum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    /// Resting look
    Default,
    /// Pointer is over the entity
    Hover,
    /// The entity was the right answer
    Correct,
    /// The entity was a wrong guess
    Wrong,
    /// "On" phase of the reveal flashing
    Flash,
    /// The revealed answer that now has to be clicked
    Target,
}

/// Capabilities the quiz needs from the rendered entities
pub trait EntityAdapter {
    /// The answer name bound to `entity`
    fn extract_name(&self, entity: EntityId) -> Option<&str>;

    /// Redraws `entity` in `state`
    fn apply_visual_state(&mut self, entity: EntityId, state: VisualState);

    /// The entity bound to `name`, if any is rendered
    fn find_entity_by_name(&self, name: &str) -> Option<EntityId>;

    /// Tooltip text shown when `entity` is answered correctly
    fn describe(&self, entity: EntityId) -> Option<String> {
        self.extract_name(entity).map(str::to_string)
    }

    /// Where celebration and ripple effects for `entity` start
    ///
    /// `None` disables effects.
    fn feedback_anchor(&self, _entity: EntityId) -> Option<Position> {
        None
    }

    /// Stroke color of the reveal ripple
    fn ripple_color(&self) -> &str {
        constants::effects::RIPPLE_COLOR
    }

    /// Instruction appended to the prompt during a forced reveal
    fn locate_hint(&self) -> &str {
        "click the highlighted item to continue"
    }
}

/// Shape-specific styling and naming rules for a [`Layer`]
pub trait StyleSheet {
    /// What the host needs to draw one entity
    type Style: Clone + PartialEq;

    /// Style of an entity in `state`
    fn style(&self, state: VisualState) -> Self::Style;

    /// Properties that may hold the answer name, in priority order
    fn name_properties(&self) -> &[String];

    /// Answer name of an item
    ///
    /// The first non-empty name property wins; the item name is the
    /// fallback.
    fn extract_name(&self, item: &QuizItem) -> String {
        self.name_properties()
            .iter()
            .find_map(|key| {
                item.property(key)
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
            })
            .map_or_else(|| item.name.clone(), str::to_string)
    }

    /// Tooltip text for a correctly answered item
    fn describe(&self, item: &QuizItem) -> String {
        self.extract_name(item)
    }

    /// Ripple color, or `None` when this shape plays no effects
    fn feedback_color(&self) -> Option<&str> {
        None
    }

    /// Instruction appended to the prompt during a forced reveal
    fn locate_hint(&self) -> &str;
}

/// Stroke and fill of a line or polygon
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    /// Stroke color
    pub color: String,
    /// Stroke width in pixels
    pub weight: f64,
    /// Stroke opacity
    pub opacity: Option<f64>,
    /// Fill color, polygons only
    pub fill_color: Option<String>,
    /// Fill opacity, polygons only
    pub fill_opacity: Option<f64>,
}

impl PathStyle {
    /// Copy with a different stroke color
    #[must_use]
    pub fn color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    /// Copy with a different stroke width
    #[must_use]
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Copy with a different fill color
    #[must_use]
    pub fn fill(mut self, fill_color: &str) -> Self {
        self.fill_color = Some(fill_color.to_string());
        self
    }

    /// Copy with a different fill opacity
    #[must_use]
    pub fn fill_opacity(mut self, fill_opacity: f64) -> Self {
        self.fill_opacity = Some(fill_opacity);
        self
    }
}

/// One entity as drawn on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedEntity<T> {
    /// The item the entity stands for
    pub item: QuizItem,
    /// Answer name, extracted once when the layer is built
    pub name: String,
    /// Current visual state
    pub state: VisualState,
    /// Current style, derived from `state`
    pub style: T,
}

/// The collection of rendered entities of one quiz
///
/// The host draws from [`Layer::entities`] and redraws the ids returned by
/// [`Layer::take_changes`] after each engine call.
#[derive_where(Debug; S, S::Style)]
pub struct Layer<S: StyleSheet> {
    sheet: S,
    entities: Vec<RenderedEntity<S::Style>>,
    changes: Vec<EntityId>,
}

impl<S: StyleSheet> Layer<S> {
    /// Renders every item in its default style
    pub fn new(sheet: S, items: impl IntoIterator<Item = QuizItem>) -> Self {
        let entities = items
            .into_iter()
            .map(|item| RenderedEntity {
                name: sheet.extract_name(&item),
                item,
                state: VisualState::Default,
                style: sheet.style(VisualState::Default),
            })
            .collect();
        Self {
            sheet,
            entities,
            changes: Vec::new(),
        }
    }

    /// The style sheet in use
    pub fn sheet(&self) -> &S {
        &self.sheet
    }

    /// All entities, indexed by [`EntityId`]
    pub fn entities(&self) -> &[RenderedEntity<S::Style>] {
        &self.entities
    }

    /// One entity
    pub fn get(&self, entity: EntityId) -> Option<&RenderedEntity<S::Style>> {
        self.entities.get(entity.0)
    }

    /// Ids of all entities
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        (0..self.entities.len()).map(EntityId)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the layer has no entity
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities whose style changed since the last call, each once
    pub fn take_changes(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.changes).into_iter().unique().collect()
    }
}

impl<S: StyleSheet> EntityAdapter for Layer<S> {
    fn extract_name(&self, entity: EntityId) -> Option<&str> {
        self.get(entity).map(|e| e.name.as_str())
    }

    fn apply_visual_state(&mut self, entity: EntityId, state: VisualState) {
        let Some(rendered) = self.entities.get_mut(entity.0) else {
            return;
        };
        let style = self.sheet.style(state);
        rendered.state = state;
        if rendered.style != style {
            rendered.style = style;
            self.changes.push(entity);
        }
    }

    fn find_entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .position(|e| e.name == name)
            .map(EntityId)
    }

    fn describe(&self, entity: EntityId) -> Option<String> {
        self.get(entity).map(|e| self.sheet.describe(&e.item))
    }

    fn feedback_anchor(&self, entity: EntityId) -> Option<Position> {
        self.sheet.feedback_color()?;
        self.get(entity)?.item.geometry.anchor()
    }

    fn ripple_color(&self) -> &str {
        self.sheet
            .feedback_color()
            .unwrap_or(constants::effects::RIPPLE_COLOR)
    }

    fn locate_hint(&self) -> &str {
        self.sheet.locate_hint()
    }
}
