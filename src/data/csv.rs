//! CSV to quiz item conversion
//!
//! Location quizzes ship as flat CSV files with one row per place. The
//! parser understands RFC 4180 quoting (including doubled quotes and line
//! breaks inside quoted fields) and nothing more.

use std::collections::BTreeMap;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::item::{Geometry, Position, QuizItem};

/// Property key under which the comment column is stored
pub const COMMENT_PROPERTY: &str = "Comment";
/// Property key under which the extra tooltip column is stored
pub const EXTRA_PROPERTY: &str = "Extra";

/// Which CSV columns hold which quiz item fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CsvMapping {
    /// Column holding the item name
    #[garde(length(min = 1))]
    pub name: String,
    /// Column holding the latitude
    #[garde(length(min = 1))]
    pub lat: String,
    /// Column holding the longitude
    #[garde(length(min = 1))]
    pub lng: String,
    /// Optional free-text comment column
    #[garde(skip)]
    #[serde(default)]
    pub comment: Option<String>,
    /// Optional column shown with its header as a label in tooltips
    #[garde(skip)]
    #[serde(default)]
    pub extra_tooltip_field: Option<String>,
    /// Further columns copied into the item properties, keyed by property name
    #[garde(skip)]
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

impl CsvMapping {
    /// Mapping with only the three required columns
    pub fn new(name: impl Into<String>, lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat: lat.into(),
            lng: lng.into(),
            comment: None,
            extra_tooltip_field: None,
            columns: BTreeMap::new(),
        }
    }
}

/// Splits CSV text into rows of cells
///
/// Rows whose cells are all blank are skipped. A trailing newline does not
/// produce an extra row.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => row.push(std::mem::take(&mut cell)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut cell));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            _ => cell.push(ch),
        }
    }

    row.push(cell);
    push_row(&mut rows, row);
    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.iter().any(|cell| !cell.trim().is_empty()) {
        rows.push(row);
    }
}

/// Converts CSV text into point items using `mapping`
///
/// # Errors
///
/// Returns [`Error::MissingColumn`] when the header lacks the name,
/// latitude or longitude column. Rows without a name or with coordinates
/// that are not finite numbers are dropped, not reported.
pub fn to_items(text: &str, mapping: &CsvMapping) -> Result<Vec<QuizItem>> {
    let rows = parse_csv(text);
    let Some((header, body)) = rows.split_first() else {
        return Ok(Vec::new());
    };

    let header = header
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect_vec();
    let column = |name: &str| header.iter().position(|h| *h == name);
    let required = |name: &str| column(name).ok_or_else(|| Error::MissingColumn(name.to_string()));

    let name_idx = required(&mapping.name)?;
    let lat_idx = required(&mapping.lat)?;
    let lng_idx = required(&mapping.lng)?;
    let comment_idx = mapping.comment.as_deref().and_then(column);
    let extra_idx = mapping.extra_tooltip_field.as_deref().and_then(column);
    let extra_columns = mapping
        .columns
        .iter()
        .filter_map(|(key, col)| column(col).map(|idx| (key.clone(), idx)))
        .collect_vec();

    let cell = |cols: &[String], idx: usize| cols.get(idx).map_or("", |c| c.trim()).to_string();

    let items = body
        .iter()
        .enumerate()
        .filter_map(|(line, cols)| {
            let name = cell(cols, name_idx);
            let lat = cell(cols, lat_idx).parse::<f64>().ok();
            let lng = cell(cols, lng_idx).parse::<f64>().ok();
            let position = match (lat, lng) {
                (Some(lat), Some(lng)) => Position::new(lat, lng),
                _ => {
                    tracing::debug!(line = line + 2, "dropping csv row without coordinates");
                    return None;
                }
            };
            if name.is_empty() || !position.is_finite() {
                tracing::debug!(line = line + 2, "dropping incomplete csv row");
                return None;
            }

            let mut item = QuizItem::new(name, Geometry::Point(position));
            let optional = [(COMMENT_PROPERTY, comment_idx), (EXTRA_PROPERTY, extra_idx)];
            for (key, idx) in optional {
                if let Some(idx) = idx {
                    item.properties.insert(key.to_string(), cell(cols, idx));
                }
            }
            for (key, idx) in &extra_columns {
                let value = cell(cols, *idx);
                if !value.is_empty() {
                    item.properties.insert(key.clone(), value);
                }
            }
            Some(item)
        })
        .collect_vec();

    if items.len() < body.len() {
        tracing::warn!(
            kept = items.len(),
            dropped = body.len() - items.len(),
            "csv rows dropped"
        );
    }

    Ok(items)
}
