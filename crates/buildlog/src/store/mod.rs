//! Store module: Parquet persistence of parsed entries.
//!
//! The file layout is one row per log line with a fixed schema (see
//! [`schema::log_schema`]). Classification flags are computed once, at
//! write time, and stored alongside the content.

pub mod schema;
pub mod writer;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

use crate::stream::StreamError;

pub use schema::{log_schema, ParquetLogEntry};
pub use writer::{export_entries, export_iter, export_iter_filtered, ParquetLogWriter};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// The source stream failed; the export is abandoned
    #[error("Error during iteration: {0}")]
    Stream(#[from] StreamError),
}
