//! Output frame types
//!
//! A `Frame` is an ordered list of named, typed columns plus shape
//! metadata. It serializes to JSON as:
//!
//! ```json
//! {
//!   "name": "A",
//!   "fields": [
//!     {"name": "time", "type": "time", "values": ["2023-01-01T10:00:00Z"]},
//!     {"name": "us cpu", "type": "number", "values": [1.5]}
//!   ],
//!   "meta": {"shape": "wide", "rows": 1, "dropped_records": 0}
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Layout of a frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FrameShape {
    /// Time column followed by one numeric column per series and field
    Wide,
    /// String columns, one row per record
    Table,
    /// No columns (hidden query or unsupported format)
    Empty,
}

impl std::fmt::Display for FrameShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameShape::Wide => write!(f, "wide"),
            FrameShape::Table => write!(f, "table"),
            FrameShape::Empty => write!(f, "empty"),
        }
    }
}

/// Column values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum FieldValues {
    Time(Vec<DateTime<Utc>>),
    Number(Vec<Option<f64>>),
    String(Vec<String>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Time(v) => v.len(),
            FieldValues::Number(v) => v.len(),
            FieldValues::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub values: FieldValues,
}

impl Field {
    pub fn new(name: impl Into<String>, values: FieldValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric values, if this is a number column
    pub fn numbers(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            FieldValues::Number(v) => Some(v),
            _ => None,
        }
    }

    /// String values, if this is a string column
    pub fn strings(&self) -> Option<&[String]> {
        match &self.values {
            FieldValues::String(v) => Some(v),
            _ => None,
        }
    }

    /// Timestamps, if this is a time column
    pub fn times(&self) -> Option<&[DateTime<Utc>]> {
        match &self.values {
            FieldValues::Time(v) => Some(v),
            _ => None,
        }
    }
}

/// Frame metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameMeta {
    pub shape: FrameShape,
    /// Number of rows in every column
    pub rows: usize,
    /// Records dropped for an unusable timestamp
    #[serde(default)]
    pub dropped_records: usize,
    /// Explanation attached to empty frames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Columnar result of one query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    /// Reference id of the originating query
    pub name: String,
    pub fields: Vec<Field>,
    pub meta: FrameMeta,
}

impl Frame {
    /// A frame with no columns
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            meta: FrameMeta {
                shape: FrameShape::Empty,
                rows: 0,
                dropped_records: 0,
                notice: None,
            },
        }
    }

    /// Builder: attach a notice to the metadata
    pub fn notice(mut self, notice: impl Into<String>) -> Self {
        self.meta.notice = Some(notice.into());
        self
    }

    pub fn rows(&self) -> usize {
        self.meta.rows
    }

    pub fn shape(&self) -> FrameShape {
        self.meta.shape
    }

    /// Find a column by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Column names in frame order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
