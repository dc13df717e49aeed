use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use buildlog::config::Settings;
use buildlog::query::{ParquetEntries, ParquetLogEntry, ParquetLogReader, QueryError};

use crate::cli::QueryArgs;
use crate::render;

pub fn run(args: &QueryArgs, settings: &Settings) -> Result<()> {
    let reader = ParquetLogReader::open_with(&args.file, &settings.query)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.is_row_listing() {
        list_rows(&reader, args, &mut out)?;
    } else {
        let result = reader
            .query(args.op, args.group.as_deref(), args.limit)
            .with_context(|| format!("Query {} failed", args.op))?;

        if args.json {
            serde_json::to_writer_pretty(&mut out, &result)?;
            writeln!(out)?;
        } else {
            render::write_query_result(
                &mut out,
                args.op,
                args.group.as_deref(),
                &result,
                !args.no_stats,
            )?;
        }
    }

    out.flush()?;
    Ok(())
}

/// `--seek` / `--tail`: stream rows from a position, optionally narrowed
/// by `--group`, stopping after `--limit`
fn list_rows<W: Write>(reader: &ParquetLogReader, args: &QueryArgs, out: &mut W) -> Result<()> {
    let rows: ParquetEntries = match (args.seek, args.tail) {
        (Some(row), _) => reader.seek_to_row(row)?,
        (None, Some(n)) => reader.tail(n)?,
        (None, None) => reader.entries()?,
    };

    let rows: Box<dyn Iterator<Item = Result<ParquetLogEntry, QueryError>>> = match &args.group {
        Some(pattern) => Box::new(buildlog::query::GroupFilter::new(rows, pattern)?),
        None => Box::new(rows),
    };

    for entry in rows.take(args.limit.unwrap_or(usize::MAX)) {
        let entry = entry.context("Failed to read rows")?;
        if args.json {
            serde_json::to_writer(&mut *out, &entry)?;
            writeln!(out)?;
        } else {
            render::write_stored_entry(out, &entry)?;
        }
    }
    Ok(())
}
