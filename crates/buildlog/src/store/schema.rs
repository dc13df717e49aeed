use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::parser::LogEntry;

pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_CONTENT: &str = "content";
pub const COL_GROUP: &str = "group";
pub const COL_HAS_TIMESTAMP: &str = "has_timestamp";
pub const COL_IS_COMMAND: &str = "is_command";
pub const COL_IS_GROUP: &str = "is_group";
pub const COL_IS_PROGRESS: &str = "is_progress";
pub const COL_RAW_LINE_SIZE: &str = "raw_line_size";

/// Arrow schema of an exported log file. Other tools read these files, so
/// names and types are fixed.
pub fn log_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(COL_TIMESTAMP, DataType::Int64, false),
        Field::new(COL_CONTENT, DataType::Utf8, false),
        Field::new(COL_GROUP, DataType::Utf8, false),
        Field::new(COL_HAS_TIMESTAMP, DataType::Boolean, false),
        Field::new(COL_IS_COMMAND, DataType::Boolean, false),
        Field::new(COL_IS_GROUP, DataType::Boolean, false),
        Field::new(COL_IS_PROGRESS, DataType::Boolean, false),
        Field::new(COL_RAW_LINE_SIZE, DataType::Int32, false),
    ]))
}

/// One row of an exported log file.
///
/// `timestamp` is milliseconds since the epoch with 0 standing for "no
/// timestamp". A line really stamped at 1970-01-01T00:00:00.000Z is stored
/// the same way; `has_timestamp` is the only thing telling them apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParquetLogEntry {
    pub timestamp: i64,
    pub content: String,
    pub group: String,
    pub has_timestamp: bool,
    pub is_command: bool,
    pub is_group: bool,
    pub is_progress: bool,
    pub raw_line_size: i32,
}

impl ParquetLogEntry {
    /// Group name used for display and matching; `<no group>` when empty
    pub fn group_name(&self) -> &str {
        if self.group.is_empty() {
            crate::parser::NO_GROUP
        } else {
            &self.group
        }
    }
}

impl From<LogEntry> for ParquetLogEntry {
    fn from(entry: LogEntry) -> Self {
        let flags = entry.flags();
        Self {
            timestamp: entry.timestamp.unwrap_or(0),
            raw_line_size: raw_size_i32(entry.raw_size()),
            content: entry.content,
            group: entry.group,
            has_timestamp: flags.has_timestamp,
            is_command: flags.is_command,
            is_group: flags.is_group,
            is_progress: flags.is_progress,
        }
    }
}

impl From<&LogEntry> for ParquetLogEntry {
    fn from(entry: &LogEntry) -> Self {
        let flags = entry.flags();
        Self {
            timestamp: entry.timestamp.unwrap_or(0),
            content: entry.content.clone(),
            group: entry.group.clone(),
            has_timestamp: flags.has_timestamp,
            is_command: flags.is_command,
            is_group: flags.is_group,
            is_progress: flags.is_progress,
            raw_line_size: raw_size_i32(entry.raw_size()),
        }
    }
}

/// Lines over 2 GiB saturate
fn raw_size_i32(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

/// Build one Arrow record batch from rows, in order.
pub fn to_record_batch(
    schema: &SchemaRef,
    rows: &[ParquetLogEntry],
) -> Result<RecordBatch, ArrowError> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.timestamp))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.content.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.group.as_str()))),
        Arc::new(bool_column(rows, |r| r.has_timestamp)),
        Arc::new(bool_column(rows, |r| r.is_command)),
        Arc::new(bool_column(rows, |r| r.is_group)),
        Arc::new(bool_column(rows, |r| r.is_progress)),
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.raw_line_size))),
    ];
    RecordBatch::try_new(Arc::clone(schema), columns)
}

fn bool_column(rows: &[ParquetLogEntry], f: impl Fn(&ParquetLogEntry) -> bool) -> BooleanArray {
    BooleanArray::from(rows.iter().map(f).collect::<Vec<bool>>())
}
