use std::borrow::Cow;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::ansi::strip_ansi;
use super::classify;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A complete timestamp frame whose field is not a base-10 integer
    #[error("Invalid timestamp in frame: {0:?}")]
    InvalidTimestamp(String),

    #[error("Line too large: {0} bytes (max: {1} bytes)")]
    LineTooLarge(usize, usize),
}

/// One parsed log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch, `None` for lines without a frame.
    /// `Some(0)` is a real timestamp and differs from `None`.
    pub timestamp: Option<i64>,

    /// Payload after the frame, ANSI codes still present
    pub content: String,

    /// Original line bytes (newline excluded)
    pub raw: Bytes,

    /// Cleaned content of the most recent group header, empty before the first
    pub group: String,
}

/// The four classification flags, computed together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFlags {
    pub has_timestamp: bool,
    pub is_command: bool,
    pub is_group: bool,
    pub is_progress: bool,
}

impl LogEntry {
    /// Create an unframed entry: no timestamp, content is the whole line
    pub fn plain_text(raw: Bytes) -> Self {
        let content = String::from_utf8_lossy(&raw).into_owned();
        Self {
            timestamp: None,
            content,
            raw,
            group: String::new(),
        }
    }

    /// Content with ANSI escape sequences removed
    pub fn clean_content(&self) -> Cow<'_, str> {
        strip_ansi(&self.content)
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }

    /// Timestamp as a UTC datetime, if present and representable
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }

    pub fn is_command(&self) -> bool {
        classify::is_command(&self.clean_content())
    }

    pub fn is_group(&self) -> bool {
        classify::is_group_header(&self.clean_content())
    }

    pub fn is_progress(&self) -> bool {
        classify::is_progress(&self.content, &self.clean_content())
    }

    /// All classification flags with a single ANSI strip.
    pub fn flags(&self) -> EntryFlags {
        let clean = self.clean_content();
        EntryFlags {
            has_timestamp: self.has_timestamp(),
            is_command: classify::is_command(&clean),
            is_group: classify::is_group_header(&clean),
            is_progress: classify::is_progress(&self.content, &clean),
        }
    }

    /// Size of the original line in bytes
    pub fn raw_size(&self) -> usize {
        self.raw.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content: &str) -> LogEntry {
        LogEntry {
            timestamp: None,
            content: content.to_string(),
            raw: Bytes::copy_from_slice(content.as_bytes()),
            group: String::new(),
        }
    }

    #[test]
    fn test_epoch_zero_is_a_timestamp() {
        let mut e = entry("x");
        assert!(!e.has_timestamp());
        e.timestamp = Some(0);
        assert!(e.has_timestamp());
        assert_eq!(e.datetime(), DateTime::from_timestamp(0, 0));
    }

    #[test]
    fn test_datetime_conversion() {
        let mut e = entry("x");
        e.timestamp = Some(1_745_322_209_921);
        let dt = e.datetime().unwrap();
        assert_eq!(dt.timestamp_millis(), 1_745_322_209_921);
    }

    #[test]
    fn test_datetime_out_of_chrono_range() {
        let mut e = entry("x");
        e.timestamp = Some(i64::MAX);
        assert!(e.has_timestamp());
        assert_eq!(e.datetime(), None);
    }

    #[test]
    fn test_flags_match_individual_predicates() {
        let samples = [
            "\x1b[1m$ npm test\x1b[0m",
            "~~~ Running tests",
            "remote: Counting objects: 100% (54/54)[K",
            "plain output",
        ];
        for s in samples {
            let e = entry(s);
            let flags = e.flags();
            assert_eq!(flags.is_command, e.is_command(), "{:?}", s);
            assert_eq!(flags.is_group, e.is_group(), "{:?}", s);
            assert_eq!(flags.is_progress, e.is_progress(), "{:?}", s);
            assert!(!flags.has_timestamp);
        }
    }

    #[test]
    fn test_plain_text_non_utf8() {
        let e = LogEntry::plain_text(Bytes::from_static(b"ok \xFF\xFE"));
        assert_eq!(e.content, "ok \u{FFFD}\u{FFFD}");
        assert_eq!(e.raw_size(), 5);
    }
}
