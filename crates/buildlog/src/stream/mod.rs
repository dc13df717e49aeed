//! Stream module: lazy, pull-based parsing of whole log streams.
//!
//! [`LogEntries`] wraps any `BufRead`, [`parse_stream`] any tokio
//! `AsyncBufRead`. Both read exactly one line per pulled entry and stop
//! doing work as soon as the consumer stops pulling.

pub mod lines;
pub mod source;
pub mod summary;

use thiserror::Error;

use crate::parser::{LogEntry, ParseError, Parser};

pub use lines::LogEntries;
pub use source::parse_stream;
pub use summary::ProcessingSummary;

#[derive(Debug, Error)]
pub enum StreamError {
    /// One bad line; the stream can keep going
    #[error("line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: ParseError,
    },

    /// Reading the source failed; the stream ends here
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamError {
    /// True for per-line errors that leave the stream usable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StreamError::Parse { .. })
    }
}

/// Drop the line terminator (`\n` or `\r\n`) left by `read_until`.
#[inline]
pub(crate) fn trim_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}

/// Size-check and parse one line read from a stream.
#[inline]
pub(crate) fn decode_line(
    parser: &mut Parser,
    line: &[u8],
    line_number: u64,
    max_line_size: usize,
) -> Result<LogEntry, StreamError> {
    // SECURITY: one giant line must not end up as one giant entry
    if line.len() > max_line_size {
        return Err(StreamError::Parse {
            line: line_number,
            source: ParseError::LineTooLarge(line.len(), max_line_size),
        });
    }

    parser.parse_line(line).map_err(|source| StreamError::Parse {
        line: line_number,
        source,
    })
}
