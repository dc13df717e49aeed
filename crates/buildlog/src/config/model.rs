use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::MAX_LINE_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub parser: ParserConfig,
    pub store: StoreConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Longest line accepted, in bytes
    pub max_line_size: usize,
}

/// Parquet export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Rows buffered before a batch is handed to the Parquet writer
    pub batch_size: usize,
    pub max_row_group_size: usize,
    pub compression: Compression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Snappy,
    Zstd,
}

/// Parquet query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Rows decoded per batch while streaming a file
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogOutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutputFormat {
    Json,
    Pretty,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_line_size: MAX_LINE_SIZE,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_row_group_size: 1024 * 1024,
            compression: Compression::Snappy,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { batch_size: 5000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn,buildlog=info,bklog=info".to_string(),
            format: LogOutputFormat::Pretty,
        }
    }
}
