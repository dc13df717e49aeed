/// Build-log line parsing and classification
///
/// Turns raw log lines into structured [`LogEntry`] records.
///
/// # Architecture
///
/// - `scanner.rs`: byte-level timestamp frame extraction (stateless)
/// - `ansi.rs`: ANSI escape stripping (stateless)
/// - `classify.rs`: command / group header / progress predicates (stateless)
/// - `tracker.rs`: the per-stream [`Parser`] holding the current group
/// - `model.rs`: `LogEntry`, `ParseError`
///
/// Everything except `Parser` is a pure function of its input, so the
/// predicates can be recomputed on demand instead of cached.

pub mod model;
pub mod scanner;
pub mod classify;
pub mod tracker;
mod ansi;

// Re-export commonly used types
pub use model::{EntryFlags, LogEntry, ParseError};
pub use tracker::Parser;
pub use classify::EntryFilter;
pub use scanner::scan_line;
pub use ansi::{strip_ansi, strip_ansi_bytes};

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
pub const NO_GROUP: &str = "<no group>";
