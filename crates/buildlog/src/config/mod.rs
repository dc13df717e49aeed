//! Config module: tunables for parsing, export and queries.

pub mod model;
pub mod load;

pub use model::{
    Compression, ConfigError, LogOutputFormat, LoggingConfig, ParserConfig, QueryConfig,
    Settings, StoreConfig,
};
