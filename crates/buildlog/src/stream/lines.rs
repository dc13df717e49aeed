use std::io::BufRead;

use crate::parser::{LogEntry, Parser, MAX_LINE_SIZE};

use super::{decode_line, trim_line_ending, StreamError};

/// Lazy iterator of parsed entries over a `BufRead` source.
///
/// - one `next()` reads and parses exactly one line
/// - a bad line yields `Err(StreamError::Parse)`; the next call moves on
/// - a read failure yields `Err(StreamError::Io)` once, then `None`
///
/// Dropping the iterator drops the reader with it.
pub struct LogEntries<R> {
    reader: R,
    parser: Parser,
    buf: Vec<u8>,
    line_number: u64,
    bytes_read: u64,
    max_line_size: usize,
    finished: bool,
}

impl<R: BufRead> LogEntries<R> {
    pub fn new(reader: R, parser: Parser) -> Self {
        Self {
            reader,
            parser,
            buf: Vec::with_capacity(256),
            line_number: 0,
            bytes_read: 0,
            max_line_size: MAX_LINE_SIZE,
            finished: false,
        }
    }

    /// Lines above this size yield `ParseError::LineTooLarge`
    pub fn with_max_line_size(mut self, max_line_size: usize) -> Self {
        self.max_line_size = max_line_size;
        self
    }

    /// Number of lines read so far
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Bytes consumed from the source so far, line terminators included
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Give back the parser (and its current group), dropping the reader
    pub fn into_parser(self) -> Parser {
        self.parser
    }
}

impl<R: BufRead> Iterator for LogEntries<R> {
    type Item = Result<LogEntry, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(n) => {
                self.bytes_read += n as u64;
                self.line_number += 1;
                trim_line_ending(&mut self.buf);
                Some(decode_line(
                    &mut self.parser,
                    &self.buf,
                    self.line_number,
                    self.max_line_size,
                ))
            }
            Err(e) => {
                tracing::debug!(line = self.line_number, error = %e, "log stream read failed");
                self.finished = true;
                Some(Err(StreamError::Io(e)))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for LogEntries<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::io::{self, BufReader, Read};
    use std::rc::Rc;

    /// Hands out one line per `read()` call and counts the calls.
    struct CountingReader {
        lines: VecDeque<Vec<u8>>,
        reads: Rc<Cell<usize>>,
    }

    impl CountingReader {
        fn new(lines: &[&str], reads: Rc<Cell<usize>>) -> Self {
            Self {
                lines: lines.iter().map(|l| format!("{}\n", l).into_bytes()).collect(),
                reads,
            }
        }
    }

    impl Read for CountingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads.set(self.reads.get() + 1);
            match self.lines.pop_front() {
                Some(line) => {
                    let n = line.len().min(buf.len());
                    buf[..n].copy_from_slice(&line[..n]);
                    Ok(n)
                }
                None => Ok(0),
            }
        }
    }

    /// Fails on the first read.
    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"))
        }
    }

    #[test]
    fn test_yields_entries_in_order() {
        let input = "\x1b_bk;t=1000\x07~~~ Running tests\n\x1b_bk;t=2000\x07$ npm test\nok\n";
        let entries: Vec<LogEntry> = Parser::new()
            .entries(input.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].timestamp, Some(1000));
        assert_eq!(entries[1].content, "$ npm test");
        assert_eq!(entries[2].timestamp, None);
        assert!(entries.iter().all(|e| e.group == "~~~ Running tests"));
    }

    #[test]
    fn test_last_line_without_newline_and_crlf() {
        let input = "first\r\nsecond";
        let contents: Vec<String> = Parser::new()
            .entries(input.as_bytes())
            .map(|r| r.unwrap().content)
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_blank_lines_are_entries() {
        let entries: Vec<_> = Parser::new().entries("\n\nx\n".as_bytes()).collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].as_ref().unwrap().content, "");
    }

    #[test]
    fn test_parse_error_does_not_stop_stream() {
        let input = "~~~ Group\n\x1b_bk;t=bad\x07oops\nafter\n";
        let mut iter = Parser::new().entries(input.as_bytes());

        assert!(iter.next().unwrap().is_ok());
        match iter.next().unwrap() {
            Err(StreamError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
        let after = iter.next().unwrap().unwrap();
        assert_eq!(after.content, "after");
        assert_eq!(after.group, "~~~ Group");
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_io_error_ends_stream() {
        let mut iter = Parser::new().entries(BufReader::new(BrokenReader));
        assert!(matches!(iter.next(), Some(Err(StreamError::Io(_)))));
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_oversized_line_is_recoverable() {
        let input = "short\nthis line is far too long\nok\n";
        let results: Vec<_> = Parser::new()
            .entries(input.as_bytes())
            .with_max_line_size(10)
            .collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            &results[1],
            Err(e) if e.is_recoverable()
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_early_termination_reads_no_further() {
        let reads = Rc::new(Cell::new(0));
        let lines: Vec<String> = (0..100).map(|i| format!("line {}", i)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let reader = BufReader::new(CountingReader::new(&refs, Rc::clone(&reads)));

        let taken: Vec<_> = Parser::new().entries(reader).take(5).collect();

        assert_eq!(taken.len(), 5);
        assert_eq!(reads.get(), 5);
    }

    #[test]
    fn test_counters() {
        let mut iter = Parser::new().entries("ab\ncd\r\n".as_bytes());
        iter.next();
        assert_eq!(iter.line_number(), 1);
        assert_eq!(iter.bytes_read(), 3);
        iter.next();
        assert_eq!(iter.bytes_read(), 7);
        assert!(iter.next().is_none());
        assert_eq!(iter.line_number(), 2);
    }

    #[test]
    fn test_streaming_matches_collect_all() {
        let input = "~~~ A\n$ make\n--- B\nremote: Counting objects: 5%[K\n";
        let streamed: Vec<LogEntry> = Parser::new()
            .entries(input.as_bytes())
            .map(Result::unwrap)
            .collect();
        let all = Parser::new().parse_all(input.as_bytes()).unwrap();
        assert_eq!(streamed, all);
    }
}
