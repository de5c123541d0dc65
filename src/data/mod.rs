//! Quiz data sources
//!
//! Converts CSV tables and GeoJSON feature collections into the
//! [`QuizItem`](item::QuizItem)s a quiz is seeded with.

pub mod csv;
pub mod geojson;
pub mod item;

pub use item::{Geometry, Position, QuizItem};
