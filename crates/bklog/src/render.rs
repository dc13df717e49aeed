//! Text and JSON rendering of entries, summaries and query results.

use std::borrow::Cow;
use std::io::{self, Write};

use buildlog::parser::LogEntry;
use buildlog::query::{ParquetLogEntry, QueryOperation, QueryResult};
use buildlog::stream::ProcessingSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;

const TEXT_TIME: &str = "%Y-%m-%d %H:%M:%S%.3f";
const JSON_TIME: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const GROUP_TIME: &str = "%Y-%m-%d %H:%M:%S";
const GROUP_NAME_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, Default)]
pub struct EntryStyle {
    pub strip_ansi: bool,
    pub show_groups: bool,
}

fn content<'a>(entry: &'a LogEntry, style: EntryStyle) -> Cow<'a, str> {
    if style.strip_ansi {
        entry.clean_content()
    } else {
        Cow::Borrowed(entry.content.as_str())
    }
}

fn format_millis(ms: i64, format: &str) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.format(format).to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// `[2025-04-22 11:43:29.921] [group] content`; timestamp and group only
/// when present and asked for.
pub fn write_entry_text<W: Write>(
    out: &mut W,
    entry: &LogEntry,
    style: EntryStyle,
) -> io::Result<()> {
    let body = content(entry, style);
    if let Some(ts) = entry.timestamp {
        write!(out, "[{}] ", format_millis(ts, TEXT_TIME))?;
    }
    if style.show_groups && !entry.group.is_empty() {
        write!(out, "[{}] ", entry.group)?;
    }
    writeln!(out, "{}", body)
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    content: Cow<'a, str>,
    has_timestamp: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
}

/// One JSON object per line
pub fn write_entry_json<W: Write>(
    out: &mut W,
    entry: &LogEntry,
    style: EntryStyle,
) -> io::Result<()> {
    let json = JsonEntry {
        timestamp: entry.timestamp.map(|ts| format_millis(ts, JSON_TIME)),
        content: content(entry, style),
        has_timestamp: entry.has_timestamp(),
        group: (style.show_groups && !entry.group.is_empty()).then_some(entry.group.as_str()),
    };
    serde_json::to_writer(&mut *out, &json)?;
    writeln!(out)
}

pub fn write_summary<W: Write>(
    out: &mut W,
    summary: &ProcessingSummary,
    exported_to: Option<&str>,
) -> io::Result<()> {
    writeln!(out, "\n--- Processing Summary ---")?;
    writeln!(out, "Bytes processed: {:.1} KB", summary.bytes_processed as f64 / 1024.0)?;
    writeln!(out, "Total entries: {}", summary.total_entries)?;
    writeln!(out, "Entries with timestamps: {}", summary.entries_with_time)?;
    writeln!(out, "Commands: {}", summary.commands)?;
    writeln!(out, "Sections: {}", summary.groups)?;
    writeln!(out, "Progress updates: {}", summary.progress)?;
    let regular = summary
        .total_entries
        .saturating_sub(summary.commands + summary.groups + summary.progress);
    writeln!(out, "Regular output: {}", regular)?;

    if let Some(path) = exported_to {
        writeln!(out, "Exported {} entries to {}", summary.filtered_entries, path)?;
    } else if summary.filtered_entries != summary.total_entries {
        writeln!(out, "Matched entries: {}", summary.filtered_entries)?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> Cow<'_, str> {
    if s.chars().count() <= max {
        return Cow::Borrowed(s);
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", kept))
}

/// `[time] [CMD,GRP,PROG] content`
pub fn write_stored_entry<W: Write>(out: &mut W, entry: &ParquetLogEntry) -> io::Result<()> {
    let mut markers = Vec::new();
    if entry.is_command {
        markers.push("CMD");
    }
    if entry.is_group {
        markers.push("GRP");
    }
    if entry.is_progress {
        markers.push("PROG");
    }

    write!(out, "[{}]", format_millis(entry.timestamp, TEXT_TIME))?;
    if !markers.is_empty() {
        write!(out, " [{}]", markers.join(","))?;
    }
    writeln!(out, " {}", entry.content)
}

pub fn write_query_result<W: Write>(
    out: &mut W,
    operation: QueryOperation,
    pattern: Option<&str>,
    result: &QueryResult,
    show_stats: bool,
) -> io::Result<()> {
    match operation {
        QueryOperation::ListGroups => {
            writeln!(out, "Groups found: {}\n", result.groups.len())?;
            if result.groups.is_empty() {
                writeln!(out, "No groups found.")?;
                return Ok(());
            }

            writeln!(
                out,
                "{:<40} {:>8} {:>8} {:>8} {:>19} {:>19}",
                "GROUP NAME", "ENTRIES", "COMMANDS", "PROGRESS", "FIRST SEEN", "LAST SEEN"
            )?;
            writeln!(out, "{}", "-".repeat(120))?;
            for group in &result.groups {
                writeln!(
                    out,
                    "{:<40} {:>8} {:>8} {:>8} {:>19} {:>19}",
                    truncate(&group.name, GROUP_NAME_WIDTH),
                    group.entry_count,
                    group.commands,
                    group.progress,
                    format_millis(group.first_seen, GROUP_TIME),
                    format_millis(group.last_seen, GROUP_TIME),
                )?;
            }
        }
        QueryOperation::ByGroup => {
            writeln!(
                out,
                "Entries in group matching '{}': {}\n",
                pattern.unwrap_or_default(),
                result.entries.len()
            )?;
            if result.entries.is_empty() {
                writeln!(out, "No entries found for the specified group.")?;
                return Ok(());
            }
            for entry in &result.entries {
                write_stored_entry(out, entry)?;
            }
        }
        QueryOperation::Info => {
            if let Some(info) = &result.info {
                writeln!(out, "Rows: {}", info.row_count)?;
                writeln!(out, "Columns: {}", info.column_count)?;
                writeln!(out, "Row groups: {}", info.num_row_groups)?;
                writeln!(out, "File size: {:.1} KB", info.file_size as f64 / 1024.0)?;
            }
        }
    }

    if show_stats {
        writeln!(out, "\n--- Query Statistics ---")?;
        writeln!(out, "Total entries: {}", result.stats.total_entries)?;
        writeln!(out, "Matched entries: {}", result.stats.matched_entries)?;
        if result.stats.total_groups > 0 {
            writeln!(out, "Total groups: {}", result.stats.total_groups)?;
        }
        writeln!(out, "Query time: {:.2} ms", result.stats.query_time_ms)?;
    }
    Ok(())
}
