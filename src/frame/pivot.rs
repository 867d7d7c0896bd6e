//! Series pivot
//!
//! Turns row-oriented records into columns.
//!
//! # Time-series mode
//!
//! ```text
//! time  region  cpu            time  us cpu  eu cpu
//! T2    us      1.7     →      T1    1.5     -
//! T1    us      1.5            T1    -       2.0
//! T1    eu      2.0            T2    1.7     -
//! ```
//!
//! Records are stably sorted by time and each one owns one axis position.
//! Every `(series key, numeric field)` pair observed gets a column as long
//! as the axis; a record writes only into its own series' columns, so every
//! other cell stays null.
//!
//! # Table mode
//!
//! No sorting and no series split: one string column per field, one entry
//! per retained record in input order.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::classify::{Classified, TimedRecord};
use super::types::{is_reserved, FieldSet, SeriesKey};

/// One numeric column of a wide frame
#[derive(Debug, Clone, PartialEq)]
pub struct ValueColumn {
    pub key: SeriesKey,
    pub field: String,
    /// Position-aligned with the time axis
    pub values: Vec<Option<f64>>,
}

impl ValueColumn {
    /// Visible column name
    pub fn name(&self) -> String {
        self.key.column_name(&self.field)
    }
}

/// Pivot output for time-series mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesColumns {
    /// Sorted time axis, one entry per record
    pub time: Vec<DateTime<Utc>>,
    /// Value columns ordered by (series key, field)
    pub values: Vec<ValueColumn>,
}

impl SeriesColumns {
    pub fn rows(&self) -> usize {
        self.time.len()
    }

    /// Find a column by series key and field
    pub fn column(&self, key: &str, field: &str) -> Option<&ValueColumn> {
        self.values
            .iter()
            .find(|c| c.key.as_str() == key && c.field == field)
    }
}

/// One string column of a table frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringColumn {
    pub name: String,
    pub values: Vec<String>,
}

/// Pivot output for table mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableColumns {
    pub rows: usize,
    /// Columns ordered by name
    pub columns: Vec<StringColumn>,
}

impl TableColumns {
    pub fn column(&self, name: &str) -> Option<&StringColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Build the wide time-series columns
pub fn pivot_series(classified: Classified) -> SeriesColumns {
    let Classified {
        mut records,
        classification,
    } = classified;

    // Stable: records sharing a timestamp keep their input order
    records.sort_by_key(|record| record.time);

    let rows = records.len();
    let mut columns: BTreeMap<(SeriesKey, String), Vec<Option<f64>>> = BTreeMap::new();

    for (position, record) in records.iter().enumerate() {
        let key = record.series_key();

        for (field, value) in &record.numeric {
            debug_assert!(classification.is_numeric(field));
            let column = columns
                .entry((key.clone(), field.clone()))
                .or_insert_with(|| vec![None; rows]);
            column[position] = *value;
        }
    }

    tracing::debug!(
        rows,
        columns = columns.len(),
        numeric_fields = classification.numeric_fields().len(),
        categorical_fields = classification.categorical_fields().len(),
        "Pivoted records into series"
    );

    SeriesColumns {
        time: records.iter().map(|record| record.time).collect(),
        values: columns
            .into_iter()
            .map(|((key, field), values)| ValueColumn { key, field, values })
            .collect(),
    }
}

/// Build string columns for table mode
pub fn pivot_table(records: &[TimedRecord<'_>], time_field: &str) -> TableColumns {
    let mut names = FieldSet::new();
    for record in records {
        for name in record.raw.keys() {
            if name != time_field && !is_reserved(name) {
                names.insert(name.as_str());
            }
        }
    }

    let columns = names
        .iter()
        .map(|name| StringColumn {
            name: name.to_string(),
            values: records
                .iter()
                .map(|record| record.raw.get(name).cloned().unwrap_or_default())
                .collect(),
        })
        .collect();

    TableColumns {
        rows: records.len(),
        columns,
    }
}
