//! Load settings from defaults, an optional TOML file, and environment variables.

use std::fs;
use std::path::Path;

use super::model::{Compression, ConfigError, Settings};

const DEFAULT_CONFIG_FILE: &str = "bklog.toml";

impl Settings {
    /// Load settings
    /// Priority: Environment Variables > Config File > Defaults
    ///
    /// The file is `$BKLOG_CONFIG_FILE` when set (and must then exist),
    /// otherwise `bklog.toml` in the working directory if present.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match std::env::var("BKLOG_CONFIG_FILE") {
            Ok(path) => {
                tracing::debug!("Loading configuration from: {}", path);
                Self::from_file(&path)?
            }
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::debug!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };

        settings.apply_env();
        settings.validate().map_err(ConfigError::Invalid)?;
        Ok(settings)
    }

    /// Load settings from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Environment variables override file settings
    pub fn apply_env(&mut self) {
        if let Some(n) = env_parse("BKLOG_BATCH_SIZE") {
            self.store.batch_size = n;
        }
        if let Some(n) = env_parse("BKLOG_READ_BATCH_SIZE") {
            self.query.batch_size = n;
        }
        if let Some(n) = env_parse("BKLOG_MAX_LINE_SIZE") {
            self.parser.max_line_size = n;
        }
        if let Ok(compression) = std::env::var("BKLOG_COMPRESSION") {
            match compression.to_ascii_lowercase().as_str() {
                "none" => self.store.compression = Compression::None,
                "snappy" => self.store.compression = Compression::Snappy,
                "zstd" => self.store.compression = Compression::Zstd,
                other => tracing::warn!("Ignoring unknown BKLOG_COMPRESSION value: {}", other),
            }
        }
        if let Ok(level) = std::env::var("BKLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate that sizes are usable
    pub fn validate(&self) -> Result<(), String> {
        if self.parser.max_line_size == 0 {
            return Err("parser.max_line_size must be > 0".to_string());
        }
        if self.store.batch_size == 0 {
            return Err("store.batch_size must be > 0".to_string());
        }
        if self.store.max_row_group_size == 0 {
            return Err("store.max_row_group_size must be > 0".to_string());
        }
        if self.query.batch_size == 0 {
            return Err("query.batch_size must be > 0".to_string());
        }
        Ok(())
    }
}

fn env_parse(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
