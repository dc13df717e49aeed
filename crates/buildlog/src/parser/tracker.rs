//! Per-stream group tracking.
//!
//! A build log is a flat sequence of lines, but every line after a group
//! header (`~~~ Running tests`) belongs to that group until the next header.
//! [`Parser`] carries that one piece of rolling state.

use std::io::BufRead;

use super::classify::is_group_header;
use super::model::{LogEntry, ParseError};
use super::scanner::scan_line;
use crate::stream::{LogEntries, StreamError};

/// Line parser for a single log stream.
///
/// Holds the name of the current group. Create one per stream; instances
/// share nothing.
#[derive(Debug, Default, Clone)]
pub struct Parser {
    current_group: String,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line and stamp it with the current group.
    ///
    /// A group header updates the current group before stamping, so the
    /// header's own `group` is its cleaned content.
    pub fn parse_line(&mut self, line: &[u8]) -> Result<LogEntry, ParseError> {
        let mut entry = scan_line(line)?;

        {
            let clean = entry.clean_content();
            if is_group_header(&clean) {
                self.current_group = clean.into_owned();
            }
        }

        entry.group.clone_from(&self.current_group);
        Ok(entry)
    }

    /// Group the next parsed line will inherit (empty before the first header)
    pub fn current_group(&self) -> &str {
        &self.current_group
    }

    /// Forget the current group, e.g. before reusing the parser on another stream
    pub fn reset(&mut self) {
        self.current_group.clear();
    }

    /// Lazy iterator over the entries of `reader`, one line per `next()`.
    pub fn entries<R: BufRead>(self, reader: R) -> LogEntries<R> {
        LogEntries::new(reader, self)
    }

    /// Parse the whole of `reader` into memory.
    ///
    /// Holds every entry at once (O(input) memory); stops at the first
    /// error. Prefer [`Parser::entries`] for large logs.
    pub fn parse_all<R: BufRead>(&mut self, reader: R) -> Result<Vec<LogEntry>, StreamError> {
        let mut iter = LogEntries::new(reader, std::mem::take(self));
        let mut out = Vec::new();
        let result = loop {
            match iter.next() {
                Some(Ok(entry)) => out.push(entry),
                Some(Err(e)) => break Err(e),
                None => break Ok(()),
            }
        };
        *self = iter.into_parser();
        result.map(|_| out)
    }
}
