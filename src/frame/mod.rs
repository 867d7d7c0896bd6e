//! Record-to-frame conversion
//!
//! The core of slsframe: schema-less log records in, typed columns out.
//!
//! - **Types**: raw and typed records, field classification, series keys
//! - **Classify**: timestamp parsing, two-pass field typing, coercion
//! - **Pivot**: series split with sparse alignment, or plain table columns
//! - **Output**: the `Frame` handed back to the host
//! - **Assemble**: runs the pipeline for one query
//!
//! # Example
//!
//! ```rust
//! use slsframe::frame::{build_frame, FrameShape, RawRecord};
//! use slsframe::payload::{FrameFormat, QueryPayload};
//!
//! let records: Vec<RawRecord> = vec![
//!     [("time", "2023-01-01 10:00:00"), ("region", "us"), ("cpu", "1.5")],
//!     [("time", "2023-01-01 10:00:00"), ("region", "eu"), ("cpu", "2.0")],
//! ]
//! .into_iter()
//! .map(|r| r.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
//! .collect();
//!
//! let payload = QueryPayload::new("*").format(FrameFormat::TimeSeries);
//! let frame = build_frame("A", &payload, &records);
//!
//! assert_eq!(frame.shape(), FrameShape::Wide);
//! assert_eq!(frame.field_names(), vec!["time", "eu cpu", "us cpu"]);
//! ```

mod assemble;
mod classify;
mod output;
mod pivot;
mod types;

pub use assemble::{assemble_series, assemble_table, build_frame, TIME_COLUMN};
pub use classify::{parse_number, Classified, RecordClassifier, TimedRecord, TimedRecords};
pub use output::{Field, FieldValues, Frame, FrameMeta, FrameShape};
pub use pivot::{
    pivot_series, pivot_table, SeriesColumns, StringColumn, TableColumns, ValueColumn,
};
pub use types::{
    is_reserved, FieldClassification, FieldKind, FieldSet, RawRecord, SeriesKey, TypedRecord,
    RESERVED_PREFIX,
};
