//! Intermediate record types for the pivot pipeline
//!
//! - `RawRecord`: one log line as returned by the log store
//! - `FieldSet`: explicit set of field names
//! - `FieldKind` / `FieldClassification`: per-query field typing
//! - `TypedRecord`: a record after timestamp parsing and coercion
//! - `SeriesKey`: grouping identity built from categorical values

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One log line: field name to string value. Absent keys mean "not present".
pub type RawRecord = std::collections::HashMap<String, String>;

/// Fields starting with this prefix are log store metadata (`__time__`,
/// `__source__`, `__topic__`, ...)
pub const RESERVED_PREFIX: &str = "__";

/// Check whether a field name is reserved metadata
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// An ordered set of field names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(BTreeSet<String>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name, returning true if it was not present
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// How a field's values are treated for one query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Every present value parses as a decimal float
    Numeric,
    /// At least one present value is not a number
    Categorical,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Numeric => write!(f, "numeric"),
            FieldKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Frozen per-query field typing
///
/// Built once over the full retained record set and never modified after,
/// so a field cannot be numeric for one record and categorical for another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldClassification {
    kinds: BTreeMap<String, FieldKind>,
}

impl FieldClassification {
    pub(crate) fn from_kinds(kinds: BTreeMap<String, FieldKind>) -> Self {
        Self { kinds }
    }

    /// Kind of a field, `None` if it never appeared
    pub fn get(&self, name: &str) -> Option<FieldKind> {
        self.kinds.get(name).copied()
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.get(name) == Some(FieldKind::Numeric)
    }

    pub fn numeric_fields(&self) -> FieldSet {
        self.fields_of(FieldKind::Numeric)
    }

    pub fn categorical_fields(&self) -> FieldSet {
        self.fields_of(FieldKind::Categorical)
    }

    fn fields_of(&self, kind: FieldKind) -> FieldSet {
        self.kinds
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Number of classified fields
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Fields and kinds in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.kinds.iter().map(|(name, kind)| (name.as_str(), *kind))
    }
}

/// A record after timestamp parsing and value coercion
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRecord {
    /// Parsed record timestamp
    pub time: DateTime<Utc>,
    /// Numeric fields; `None` when the value failed coercion
    pub numeric: BTreeMap<String, Option<f64>>,
    /// Categorical fields with their raw values
    pub categorical: BTreeMap<String, String>,
}

impl TypedRecord {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time,
            numeric: BTreeMap::new(),
            categorical: BTreeMap::new(),
        }
    }

    /// Builder: add a numeric value
    pub fn number(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        self.numeric.insert(name.into(), value);
        self
    }

    /// Builder: add a categorical value
    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.categorical.insert(name.into(), value.into());
        self
    }

    /// Series identity of this record
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::from_fields(
            self.categorical
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }
}

/// Grouping identity: categorical values ordered by field name and joined
/// with [`SeriesKey::DELIMITER`]
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey(String);

impl SeriesKey {
    pub const DELIMITER: &'static str = ",";

    /// Build a key from (field, value) pairs in any order
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut fields: Vec<(&str, &str)> = fields.into_iter().collect();
        fields.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let values: Vec<&str> = fields.into_iter().map(|(_, value)| value).collect();
        Self(values.join(Self::DELIMITER))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for records without categorical fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Externally visible name of this series' column for `field`
    pub fn column_name(&self, field: &str) -> String {
        if self.is_empty() {
            field.to_string()
        } else {
            format!("{} {}", self.0, field)
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
