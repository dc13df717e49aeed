use std::fmt;
use std::str::FromStr;

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use chrono::{DateTime, Utc};
use parquet::errors::ParquetError;
use serde::Serialize;
use thiserror::Error;

use crate::store::ParquetLogEntry;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Required columns not found: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Column '{column}' has type {actual}, expected {expected}")]
    ColumnType {
        column: &'static str,
        expected: DataType,
        actual: DataType,
    },

    #[error("Group pattern is required for by-group queries")]
    MissingPattern,

    #[error("Row {row} is out of range (file has {row_count} rows)")]
    SeekOutOfRange { row: u64, row_count: u64 },

    #[error("Unknown operation: {0} (expected list-groups, by-group or info)")]
    UnknownOperation(String),
}

/// Summary of one group across a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub name: String,
    pub entry_count: u64,
    pub commands: u64,
    pub progress: u64,
    /// Smallest timestamp in the group, in milliseconds
    pub first_seen: i64,
    pub last_seen: i64,
}

impl GroupInfo {
    pub fn first_seen_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.first_seen)
    }

    pub fn last_seen_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.last_seen)
    }
}

/// Footer metadata, no data rows involved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub row_count: u64,
    pub column_count: usize,
    pub file_size: u64,
    pub num_row_groups: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperation {
    ListGroups,
    ByGroup,
    Info,
}

impl QueryOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperation::ListGroups => "list-groups",
            QueryOperation::ByGroup => "by-group",
            QueryOperation::Info => "info",
        }
    }
}

impl fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryOperation {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list-groups" => Ok(QueryOperation::ListGroups),
            "by-group" => Ok(QueryOperation::ByGroup),
            "info" => Ok(QueryOperation::Info),
            other => Err(QueryError::UnknownOperation(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryStats {
    pub total_entries: u64,
    pub matched_entries: u64,
    pub total_groups: u64,
    pub query_time_ms: f64,
}

/// Outcome of [`ParquetLogReader::query`](super::ParquetLogReader::query)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<ParquetLogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<FileInfo>,
    pub stats: QueryStats,
}
