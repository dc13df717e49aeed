//! Query module: reading exported log files back.
//!
//! Everything here is built on one primitive, [`BatchEntries`], which turns a
//! sequence of Arrow record batches into rows one at a time. The reader hands
//! it a Parquet batch reader; filters and summaries wrap it. Each operation
//! opens its own file handle and dropping the iterator closes it.

pub mod entries;
pub mod filter;
pub mod groups;
pub mod model;
pub mod reader;

pub use crate::store::ParquetLogEntry;
pub use entries::{BatchEntries, ParquetEntries};
pub use filter::{collect_matches, GroupFilter};
pub use groups::{group_summaries, GroupSummaryBuilder};
pub use model::{FileInfo, GroupInfo, QueryError, QueryOperation, QueryResult, QueryStats};
pub use reader::ParquetLogReader;
