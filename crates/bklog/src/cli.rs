use std::path::PathBuf;

use buildlog::parser::EntryFilter;
use buildlog::query::QueryOperation;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "bklog",
    version,
    about = "Parse Buildkite job logs and query their Parquet exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a log file, print it or export it to Parquet
    Parse(ParseArgs),

    /// Query a Parquet export
    Query(QueryArgs),
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Log file to read, `-` for stdin
    #[arg(long)]
    pub file: String,

    /// One JSON object per line instead of text
    #[arg(long)]
    pub json: bool,

    /// Strip ANSI escape sequences from printed content
    #[arg(long)]
    pub strip_ansi: bool,

    /// Only keep entries of this type: command, group or progress
    #[arg(long)]
    pub filter: Option<EntryFilter>,

    /// Show the group each entry belongs to
    #[arg(long)]
    pub groups: bool,

    /// Print a processing summary at the end
    #[arg(long)]
    pub summary: bool,

    /// Export to this Parquet file instead of printing
    #[arg(long, value_name = "OUT")]
    pub parquet: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Parquet file written by `bklog parse --parquet`
    #[arg(long)]
    pub file: PathBuf,

    /// list-groups, by-group or info
    #[arg(long, default_value = "list-groups")]
    pub op: QueryOperation,

    /// Group name pattern (case-insensitive substring)
    #[arg(long)]
    pub group: Option<String>,

    /// Print rows starting at this zero-based row
    #[arg(long, conflicts_with = "tail")]
    pub seek: Option<u64>,

    /// Print the last N rows
    #[arg(long)]
    pub tail: Option<u64>,

    /// Print at most N entries
    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long)]
    pub json: bool,

    /// Hide query statistics
    #[arg(long)]
    pub no_stats: bool,
}

impl QueryArgs {
    /// `--seek`/`--tail` switch from a query operation to a row listing
    pub fn is_row_listing(&self) -> bool {
        self.seek.is_some() || self.tail.is_some()
    }
}
