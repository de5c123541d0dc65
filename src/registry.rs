//! Quiz registry
//!
//! The registry is plain data: marker visual tables, icon templates and one
//! entry per quiz, loaded from JSON. Entries name their visuals and icon by
//! key; [`Registry::from_json`] rejects keys that do not resolve so that a
//! running quiz never has to.

use std::collections::BTreeMap;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    config::{QuizOptions, Shape},
    constants::{quiz as limits, storage},
    data::csv::CsvMapping,
    error::{Error, Result},
    quiz::{
        layer::VisualState,
        point::{IconTemplate, MarkerSheet, MarkerVisual, MarkerVisuals},
    },
};

/// Keeps only the features whose property has a given value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    /// Property to compare
    #[garde(length(min = 1))]
    pub property: String,
    /// Value to keep
    #[garde(skip)]
    pub value: String,
    /// Whether the comparison is case sensitive
    #[garde(skip)]
    #[serde(default)]
    pub case_sensitive: bool,
}

/// Where a quiz gets its items from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataSource {
    /// A location table rendered as markers
    Csv {
        /// File the host fetches
        #[garde(length(min = 1))]
        file: String,
        /// Column mapping
        #[garde(dive)]
        mapping: CsvMapping,
    },
    /// A FeatureCollection rendered as lines or polygons
    #[serde(rename = "geojson", rename_all = "camelCase")]
    GeoJson {
        /// File the host fetches
        #[garde(length(min = 1))]
        file: String,
        /// Properties holding the feature name, in priority order
        #[garde(length(min = 1))]
        name_properties: Vec<String>,
        /// How the features are drawn
        #[garde(skip)]
        shape: Shape,
        /// Optional subset selection
        #[garde(dive)]
        #[serde(default)]
        filter: Option<PropertyFilter>,
    },
}

impl DataSource {
    /// File the host has to fetch
    pub fn file(&self) -> &str {
        match self {
            Self::Csv { file, .. } | Self::GeoJson { file, .. } => file,
        }
    }

    /// How the items are drawn
    pub fn shape(&self) -> Shape {
        match self {
            Self::Csv { .. } => Shape::Point,
            Self::GeoJson { shape, .. } => *shape,
        }
    }
}

/// Metadata of one quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizEntry {
    /// Top-level grouping, e.g. `WORLD` or `INDIA`
    #[garde(length(min = 1))]
    pub category: String,
    /// Optional second-level grouping
    #[garde(skip)]
    #[serde(default)]
    pub subcategory: Option<String>,
    /// Display title
    #[garde(length(min = 1, max = limits::MAX_TITLE_LENGTH))]
    pub title: String,
    /// Short description
    #[garde(length(max = limits::MAX_DESCRIPTION_LENGTH))]
    #[serde(default)]
    pub desc: String,
    /// Key into [`Registry::visuals`]
    #[garde(skip)]
    #[serde(default)]
    pub visuals: Option<String>,
    /// Key into [`Registry::icons`]
    #[garde(skip)]
    #[serde(default)]
    pub icon: Option<String>,
    /// Data source of a quiz played on this page
    #[garde(dive)]
    #[serde(default)]
    pub source: Option<DataSource>,
    /// Page of a quiz that lives elsewhere, relative to the site root
    #[garde(skip)]
    #[serde(default)]
    pub external_url: Option<String>,
    /// Announced but not playable yet
    #[garde(skip)]
    #[serde(default)]
    pub is_placeholder: bool,
    /// Overrides of the shape defaults
    #[garde(dive)]
    #[serde(default)]
    pub options: Option<QuizOptions>,
}

impl QuizEntry {
    /// Options for this quiz, falling back to the defaults of its shape
    pub fn options(&self) -> QuizOptions {
        self.options.clone().unwrap_or_else(|| {
            QuizOptions::for_shape(self.source.as_ref().map_or(Shape::Point, DataSource::shape))
        })
    }
}

/// Table of every known quiz
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    /// Named marker visual tables; states left out fall back to `default`
    #[serde(default)]
    pub visuals: BTreeMap<String, BTreeMap<VisualState, MarkerVisual>>,
    /// Named SVG icon templates
    #[serde(default)]
    pub icons: BTreeMap<String, IconTemplate>,
    /// Quizzes by identifier
    #[serde(default)]
    pub quizzes: BTreeMap<String, QuizEntry>,
}

impl Registry {
    /// Parses and checks a registry
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON, [`Error::InvalidConfig`]
    /// for an entry out of bounds and [`Error::UnknownVisuals`] or
    /// [`Error::UnknownIcon`] for a reference that does not resolve.
    pub fn from_json(text: &str) -> Result<Self> {
        let registry: Self = serde_json::from_str(text)?;
        registry.check()?;
        tracing::debug!(quizzes = registry.quizzes.len(), "registry loaded");
        Ok(registry)
    }

    fn check(&self) -> Result<()> {
        for (id, entry) in &self.quizzes {
            entry.validate().inspect_err(|report| {
                tracing::warn!(quiz = %id, %report, "invalid registry entry");
            })?;
            if let Some(visuals) = entry
                .visuals
                .as_ref()
                .filter(|key| !self.visuals.contains_key(*key))
            {
                return Err(Error::UnknownVisuals {
                    quiz: id.clone(),
                    visuals: visuals.clone(),
                });
            }
            if let Some(icon) = entry
                .icon
                .as_ref()
                .filter(|key| !self.icons.contains_key(*key))
            {
                return Err(Error::UnknownIcon {
                    quiz: id.clone(),
                    icon: icon.clone(),
                });
            }
        }
        Ok(())
    }

    /// Looks a quiz up
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownQuiz`] when `id` is not registered.
    pub fn entry(&self, id: &str) -> Result<&QuizEntry> {
        self.quizzes
            .get(id)
            .ok_or_else(|| Error::UnknownQuiz(id.to_string()))
    }

    /// The quiz selected by the `id` query parameter of `url`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingQuizId`] when the parameter is absent or
    /// empty and [`Error::UnknownQuiz`] when it names no entry.
    pub fn select(&self, url: &Url) -> Result<(&str, &QuizEntry)> {
        let id = url
            .query_pairs()
            .find(|(key, _)| key == storage::QUIZ_ID_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingQuizId)?;
        self.quizzes
            .get_key_value(id.as_str())
            .map(|(id, entry)| (id.as_str(), entry))
            .ok_or(Error::UnknownQuiz(id))
    }

    /// Marker style sheet for a quiz, built from its visuals and icon
    pub fn marker_sheet(&self, entry: &QuizEntry) -> MarkerSheet {
        let visuals = entry
            .visuals
            .as_ref()
            .and_then(|key| self.visuals.get(key))
            .map(MarkerVisuals::from_partial)
            .unwrap_or_default();
        let icon = entry
            .icon
            .as_ref()
            .and_then(|key| self.icons.get(key))
            .cloned()
            .unwrap_or_default();
        MarkerSheet::new(visuals, icon)
    }

    /// Entries of `category`, in identifier order
    pub fn in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a QuizEntry)> + 'a {
        self.quizzes
            .iter()
            .filter(move |(_, entry)| entry.category == category)
    }

    /// Identifies the quiz a standalone quiz page belongs to
    ///
    /// Pages are matched against the entries' `external_url`, in this order:
    /// same page and same query parameters in any order; same page and the
    /// entry's parameters all present (most parameters wins); the only entry
    /// on the same page.
    pub fn detect_quiz_id(&self, url: &Url) -> Option<&str> {
        let page = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_lowercase();
        let params = url.query_pairs().into_owned().collect_vec();
        let sorted_params = params.iter().cloned().sorted().collect_vec();

        let external = self
            .quizzes
            .iter()
            .filter_map(|(id, entry)| {
                let link = ExternalLink::parse(entry.external_url.as_deref()?);
                (link.page == page).then_some((id.as_str(), link))
            })
            .collect_vec();

        if let Some((id, _)) = external
            .iter()
            .find(|(_, link)| link.params.iter().cloned().sorted().collect_vec() == sorted_params)
        {
            return Some(*id);
        }

        let mut best: Option<(&str, usize)> = None;
        for (id, link) in &external {
            let subset = link.params.iter().all(|(key, value)| {
                params
                    .iter()
                    .find(|(k, _)| k == key)
                    .is_some_and(|(_, v)| v == value)
            });
            if subset && best.is_none_or(|(_, count)| link.params.len() > count) {
                best = Some((*id, link.params.len()));
            }
        }
        if let Some((id, _)) = best {
            return Some(id);
        }

        match external.as_slice() {
            [(id, _)] => Some(*id),
            _ => None,
        }
    }
}

/// Page name and query parameters of an entry's `external_url`
struct ExternalLink {
    page: String,
    params: Vec<(String, String)>,
}

impl ExternalLink {
    fn parse(link: &str) -> Self {
        let link = link.strip_prefix("quizzes/").unwrap_or(link);
        let (page, query) = link.split_once('?').unwrap_or((link, ""));
        Self {
            page: page.to_lowercase(),
            params: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }
}
