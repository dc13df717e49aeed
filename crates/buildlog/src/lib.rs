// Module structure for the buildlog core.

// Line-level parsing
pub mod parser;
pub mod stream;

// Columnar persistence and querying
pub mod store;
pub mod query;

pub mod config;

pub use parser::{LogEntry, ParseError, Parser};
pub use stream::{LogEntries, StreamError};
pub use store::{ParquetLogWriter, StoreError};
pub use query::{ParquetLogEntry, ParquetLogReader, QueryError};
