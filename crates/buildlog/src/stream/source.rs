//! Async log sources such as HTTP response bodies or pipes (any `AsyncBufRead`).

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_stream::Stream;

use crate::parser::{LogEntry, Parser};

use super::{decode_line, trim_line_ending, StreamError};

/// Parse an async source into a lazy stream of entries.
///
/// Same contract as [`LogEntries`](super::LogEntries): nothing is read until
/// the stream is polled, parse errors are yielded and skipped, a read error
/// is yielded once and ends the stream.
pub fn parse_stream<R>(
    reader: R,
    parser: Parser,
    max_line_size: usize,
) -> impl Stream<Item = Result<LogEntry, StreamError>>
where
    R: AsyncBufRead + Unpin,
{
    async_stream::stream! {
        let mut reader = reader;
        let mut parser = parser;
        let mut buf = Vec::with_capacity(256);
        let mut line_number = 0u64;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    line_number += 1;
                    trim_line_ending(&mut buf);
                    yield decode_line(&mut parser, &buf, line_number, max_line_size);
                }
                Err(e) => {
                    tracing::debug!(line = line_number, error = %e, "async log stream read failed");
                    yield Err(StreamError::Io(e));
                    break;
                }
            }
        }
    }
}
