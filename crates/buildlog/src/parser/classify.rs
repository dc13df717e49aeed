//! Line classification predicates.
//!
//! Pure functions of a line's content. `clean` is the content after
//! [`strip_ansi`](super::strip_ansi), `content` the content before it.

use std::str::FromStr;

use super::model::{EntryFlags, LogEntry};

/// Group header markers: `~~~`, `---`, `+++`
const GROUP_MARKERS: [&str; 3] = ["~~~", "---", "+++"];

const COMMAND_PREFIX: &str = "$ ";

/// Erase-in-line, with or without its ESC byte
const ERASE_LINE: &str = "[K";

/// Command execution line: `$ npm test`
#[inline]
pub fn is_command(clean: &str) -> bool {
    clean.starts_with(COMMAND_PREFIX)
}

/// Section header line, whichever of the three markers it uses
#[inline]
pub fn is_group_header(clean: &str) -> bool {
    GROUP_MARKERS.iter().any(|m| clean.starts_with(m))
}

/// In-place terminal progress update (git object counting and the like).
///
/// Needs both an erase-in-line sequence in the raw content and progress
/// wording in the clean content; `[K` alone shows up in plenty of other
/// output.
#[inline]
pub fn is_progress(content: &str, clean: &str) -> bool {
    if !content.contains(ERASE_LINE) {
        return false;
    }
    clean.contains("objects") || clean.contains("deltas") || clean.contains('%')
}

/// Entry type filter for the parse command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFilter {
    Command,
    Group,
    Progress,
}

impl EntryFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        match self {
            EntryFilter::Command => entry.is_command(),
            EntryFilter::Group => entry.is_group(),
            EntryFilter::Progress => entry.is_progress(),
        }
    }

    /// Same test against flags that were already computed
    pub fn matches_flags(&self, flags: &EntryFlags) -> bool {
        match self {
            EntryFilter::Command => flags.is_command,
            EntryFilter::Group => flags.is_group,
            EntryFilter::Progress => flags.is_progress,
        }
    }
}

impl FromStr for EntryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "command" => Ok(EntryFilter::Command),
            // "section" is the older name for a group
            "group" | "section" => Ok(EntryFilter::Group),
            "progress" => Ok(EntryFilter::Progress),
            other => Err(format!(
                "unknown filter: {} (expected command, group or progress)",
                other
            )),
        }
    }
}
