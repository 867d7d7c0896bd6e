//! Frame assembly
//!
//! Runs the whole pipeline for one query and wraps the pivot output in a
//! [`Frame`]:
//!
//! ```text
//! raw records → attach times → (classify → pivot_series) | pivot_table → Frame
//! ```

use super::classify::RecordClassifier;
use super::output::{Field, FieldValues, Frame, FrameMeta, FrameShape};
use super::pivot::{pivot_series, pivot_table, SeriesColumns, TableColumns};
use super::types::RawRecord;
use crate::payload::{FrameFormat, QueryPayload};

/// Name of the time column in wide frames
pub const TIME_COLUMN: &str = "time";

/// Build the frame for one query from its fetched records.
///
/// Hidden queries and unsupported formats produce an empty frame, never an
/// error.
pub fn build_frame(name: &str, payload: &QueryPayload, records: &[RawRecord]) -> Frame {
    if payload.hidden {
        return Frame::empty(name).notice("query is hidden");
    }

    let classifier = RecordClassifier::from_payload(payload);

    match &payload.format {
        FrameFormat::Unsupported(format) => {
            tracing::warn!(
                ref_id = %name,
                format = %format,
                "Unsupported format, returning empty frame"
            );
            Frame::empty(name).notice(format!("unsupported format '{}'", format))
        }
        FrameFormat::Table => {
            let timed = classifier.attach_times(records);
            let table = pivot_table(&timed.records, classifier.time_field());
            assemble_table(name, table, timed.dropped)
        }
        FrameFormat::TimeSeries => {
            let timed = classifier.attach_times(records);
            let dropped = timed.dropped;
            let classified = classifier.classify(&timed.records);
            assemble_series(name, pivot_series(classified), dropped)
        }
    }
}

/// Wrap time-series columns in a wide frame
pub fn assemble_series(name: &str, columns: SeriesColumns, dropped: usize) -> Frame {
    let rows = columns.rows();
    let mut fields = Vec::with_capacity(columns.values.len() + 1);
    fields.push(Field::new(TIME_COLUMN, FieldValues::Time(columns.time)));

    for column in columns.values {
        let column_name = column.name();
        fields.push(Field::new(column_name, FieldValues::Number(column.values)));
    }

    Frame {
        name: name.to_string(),
        fields,
        meta: FrameMeta {
            shape: FrameShape::Wide,
            rows,
            dropped_records: dropped,
            notice: None,
        },
    }
}

/// Wrap string columns in a table frame
pub fn assemble_table(name: &str, table: TableColumns, dropped: usize) -> Frame {
    let fields = table
        .columns
        .into_iter()
        .map(|column| Field::new(column.name, FieldValues::String(column.values)))
        .collect();

    Frame {
        name: name.to_string(),
        fields,
        meta: FrameMeta {
            shape: FrameShape::Table,
            rows: table.rows,
            dropped_records: dropped,
            notice: None,
        },
    }
}
