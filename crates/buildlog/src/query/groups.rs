use std::collections::HashMap;

use crate::store::ParquetLogEntry;

use super::model::{GroupInfo, QueryError};

/// Incremental group summaries, O(distinct groups) memory.
#[derive(Debug, Default)]
pub struct GroupSummaryBuilder {
    index: HashMap<String, usize>,
    /// In first-encountered order
    groups: Vec<GroupInfo>,
}

impl GroupSummaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: &ParquetLogEntry) {
        let name = entry.group_name();
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.groups.len();
                self.index.insert(name.to_string(), idx);
                self.groups.push(GroupInfo {
                    name: name.to_string(),
                    entry_count: 0,
                    commands: 0,
                    progress: 0,
                    first_seen: entry.timestamp,
                    last_seen: entry.timestamp,
                });
                idx
            }
        };

        let info = &mut self.groups[idx];
        info.entry_count += 1;
        info.first_seen = info.first_seen.min(entry.timestamp);
        info.last_seen = info.last_seen.max(entry.timestamp);
        if entry.is_command {
            info.commands += 1;
        }
        if entry.is_progress {
            info.progress += 1;
        }
    }

    /// Summaries ordered by `first_seen`; ties keep first-encountered order
    pub fn finish(self) -> Vec<GroupInfo> {
        let mut groups = self.groups;
        groups.sort_by_key(|g| g.first_seen);
        groups
    }
}

/// Summarize every group in one pass. The first error aborts.
pub fn group_summaries<I>(entries: I) -> Result<Vec<GroupInfo>, QueryError>
where
    I: IntoIterator<Item = Result<ParquetLogEntry, QueryError>>,
{
    let mut builder = GroupSummaryBuilder::new();
    for entry in entries {
        builder.add(&entry?);
    }
    Ok(builder.finish())
}
