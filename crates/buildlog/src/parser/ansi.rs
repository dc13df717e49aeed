/// ANSI escape code stripping
///
/// Build agents run commands in a pseudo terminal, so log content is full of
/// colour codes and erase-in-line sequences. These have to go before the
/// content can be classified (`$ `, `~~~`, ...) or shown as plain text.
///
/// This is a best-effort filter, not a terminal emulator. Two shapes are
/// removed:
///
/// - CSI sequences: `\x1b[` parameters, up to and including the first letter
/// - The same shape with the ESC byte already lost upstream: `[0;32m`, `[K`.
///   Only removed when a short lookahead finds digits/`;` followed by a letter.
use std::borrow::Cow;

const ESC: u8 = 0x1b;

/// How far past a bare `[` we look for the final letter.
const BARE_CSI_LOOKAHEAD: usize = 10;

/// Strip ANSI escape codes from text
///
/// Returns `Cow::Borrowed` when there is nothing that could be an escape
/// sequence (no ESC and no `[`), `Cow::Owned` otherwise.
pub fn strip_ansi(input: &str) -> Cow<'_, str> {
    match strip_ansi_bytes(input.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(input),
        // Only whole ASCII runs are removed, so valid UTF-8 stays valid
        Cow::Owned(bytes) => match String::from_utf8(bytes) {
            Ok(s) => Cow::Owned(s),
            Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        },
    }
}

/// Strip ANSI escape codes from bytes
pub fn strip_ansi_bytes(input: &[u8]) -> Cow<'_, [u8]> {
    // Optimization: most lines carry neither ESC nor '['.
    if !input.iter().any(|&b| b == ESC || b == b'[') {
        return Cow::Borrowed(input);
    }

    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;
    let len = input.len();

    while i < len {
        let b = input[i];

        if b == ESC && i + 1 < len && input[i + 1] == b'[' {
            i += 2; // Skip ESC [
            while i < len && !is_final_byte(input[i]) {
                i += 1;
            }
            if i < len {
                i += 1; // final letter
            }
            continue;
        }

        if b == b'[' && i + 1 < len {
            if let Some(end) = bare_csi_end(input, i) {
                i = end + 1;
                continue;
            }
        }

        output.push(b);
        i += 1;
    }

    Cow::Owned(output)
}

/// Index of the final letter of a bracket sequence starting at `start`, if
/// the bytes after `[` look like `<digits/;>*<letter>`.
#[inline]
fn bare_csi_end(input: &[u8], start: usize) -> Option<usize> {
    let limit = input.len().min(start + BARE_CSI_LOOKAHEAD);
    let mut j = start + 1;
    while j < limit {
        let b = input[j];
        if b.is_ascii_digit() || b == b';' {
            j += 1;
        } else if is_final_byte(b) {
            return Some(j);
        } else {
            return None;
        }
    }
    None
}

#[inline]
fn is_final_byte(b: u8) -> bool {
    b.is_ascii_alphabetic()
}
