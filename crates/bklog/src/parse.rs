use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use buildlog::config::Settings;
use buildlog::parser::{LogEntry, Parser};
use buildlog::store::export_iter_filtered;
use buildlog::stream::ProcessingSummary;
use buildlog::stream::StreamError;
use tracing::{info, warn};

use crate::cli::ParseArgs;
use crate::render::{self, EntryStyle};

pub fn run(args: &ParseArgs, settings: &Settings) -> Result<()> {
    let reader = open_source(&args.file)?;
    let mut entries = Parser::new()
        .entries(reader)
        .with_max_line_size(settings.parser.max_line_size);

    let mut summary = ProcessingSummary::new();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &args.parquet {
        Some(path) => {
            let counted = skip_bad_lines(entries.by_ref()).inspect(|item| {
                if let Ok(entry) = item {
                    summary.record(entry);
                }
            });
            let rows = export_iter_filtered(counted, path, &settings.store, |entry| {
                args.filter.map_or(true, |f| f.matches(entry))
            })
            .with_context(|| format!("Failed to export to {}", path.display()))?;

            summary.filtered_entries = rows;
            info!(rows, path = %path.display(), "exported parquet file");
        }
        None => {
            let style = EntryStyle {
                strip_ansi: args.strip_ansi,
                show_groups: args.groups,
            };
            for entry in skip_bad_lines(entries.by_ref()) {
                let entry = entry.context("Failed to read log")?;
                let flags = summary.record(&entry);
                if !args.filter.map_or(true, |f| f.matches_flags(&flags)) {
                    continue;
                }
                summary.record_included();

                if args.json {
                    render::write_entry_json(&mut out, &entry, style)?;
                } else {
                    render::write_entry_text(&mut out, &entry, style)?;
                }
            }
        }
    }

    summary.bytes_processed = entries.bytes_read();
    if args.summary {
        let exported = args.parquet.as_ref().map(|p| p.display().to_string());
        render::write_summary(&mut out, &summary, exported.as_deref())?;
    }
    out.flush()?;
    Ok(())
}

/// Bad lines are logged and skipped; a read error still ends the stream
fn skip_bad_lines<I>(entries: I) -> impl Iterator<Item = Result<LogEntry, StreamError>>
where
    I: Iterator<Item = Result<LogEntry, StreamError>>,
{
    entries.filter(|item| match item {
        Err(e) if e.is_recoverable() => {
            warn!("Skipping line: {}", e);
            false
        }
        _ => true,
    })
}

/// `-` reads stdin
fn open_source(file: &str) -> Result<Box<dyn BufRead>> {
    if file == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let handle = File::open(file).with_context(|| format!("Failed to open {}", file))?;
    Ok(Box::new(BufReader::new(handle)))
}
