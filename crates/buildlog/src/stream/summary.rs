use serde::Serialize;

use crate::parser::{EntryFlags, LogEntry};

/// Running counters for a parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingSummary {
    pub total_entries: u64,
    /// Entries that passed the active filter (all of them without one)
    pub filtered_entries: u64,
    pub bytes_processed: u64,
    pub entries_with_time: u64,
    pub commands: u64,
    pub groups: u64,
    pub progress: u64,
}

impl ProcessingSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one parsed entry, returning its flags so callers don't
    /// classify the entry twice.
    pub fn record(&mut self, entry: &LogEntry) -> EntryFlags {
        let flags = entry.flags();
        self.total_entries += 1;
        if flags.has_timestamp {
            self.entries_with_time += 1;
        }
        if flags.is_command {
            self.commands += 1;
        }
        if flags.is_group {
            self.groups += 1;
        }
        if flags.is_progress {
            self.progress += 1;
        }
        flags
    }

    /// Count one entry that made it through the filter
    pub fn record_included(&mut self) {
        self.filtered_entries += 1;
    }
}
