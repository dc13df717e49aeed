//! Timestamp frame scanner.
//!
//! Buildkite agents prefix every line with a private escape sequence carrying
//! the capture time in milliseconds:
//!
//! ```text
//! \x1b_bk;t=1745322209921\x07~~~ Running tests
//! ```
//!
//! This runs once per input line, so it is a plain byte scan with no
//! allocation besides the returned entry.

use bytes::Bytes;

use super::model::{LogEntry, ParseError};

/// `ESC _bk;t=`
const FRAME_START: &[u8] = b"\x1b_bk;t=";
const FRAME_END: u8 = 0x07; // BEL

/// Introducer, one digit, terminator
const MIN_FRAMED_LEN: usize = FRAME_START.len() + 2;

/// Split a raw line into timestamp and content.
///
/// - no introducer, or too short to hold a frame: whole line is content
/// - introducer without a terminator: whole line is content
/// - introducer and terminator around a non-integer: `InvalidTimestamp`
pub fn scan_line(line: &[u8]) -> Result<LogEntry, ParseError> {
    let raw = Bytes::copy_from_slice(line);

    if line.len() < MIN_FRAMED_LEN || !line.starts_with(FRAME_START) {
        return Ok(LogEntry::plain_text(raw));
    }

    let field_start = FRAME_START.len();
    let field_end = match line[field_start..].iter().position(|&b| b == FRAME_END) {
        Some(pos) => field_start + pos,
        None => return Ok(LogEntry::plain_text(raw)),
    };

    let timestamp = parse_millis(&line[field_start..field_end])?;
    let content = String::from_utf8_lossy(&line[field_end + 1..]).into_owned();

    Ok(LogEntry {
        timestamp: Some(timestamp),
        content,
        raw,
        group: String::new(),
    })
}

/// Parse a non-negative base-10 integer that fits in `i64`.
#[inline]
fn parse_millis(field: &[u8]) -> Result<i64, ParseError> {
    if field.is_empty() {
        return Err(invalid(field));
    }

    let mut value: i64 = 0;
    for &b in field {
        if !b.is_ascii_digit() {
            return Err(invalid(field));
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(b - b'0')))
            .ok_or_else(|| invalid(field))?;
    }
    Ok(value)
}

#[cold]
fn invalid(field: &[u8]) -> ParseError {
    ParseError::InvalidTimestamp(String::from_utf8_lossy(field).into_owned())
}
