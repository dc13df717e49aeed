use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::QueryConfig;
use crate::store::ParquetLogEntry;

use super::entries::{BatchEntries, ParquetEntries};
use super::filter::{collect_matches, GroupFilter};
use super::groups::group_summaries;
use super::model::{FileInfo, GroupInfo, QueryError, QueryOperation, QueryResult};

/// Reader for exported log files.
///
/// `open` reads the footer, so a missing or corrupt file fails there. After
/// that the reader only keeps the path and the footer summary: every
/// operation opens its own handle, owned by the iterator it returns.
#[derive(Debug, Clone)]
pub struct ParquetLogReader {
    path: PathBuf,
    info: FileInfo,
    batch_size: usize,
}

impl ParquetLogReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, QueryError> {
        Self::open_with(path, &QueryConfig::default())
    }

    pub fn open_with(path: impl AsRef<Path>, config: &QueryConfig) -> Result<Self, QueryError> {
        let path = path.as_ref().to_path_buf();
        let file = open_file(&path)?;
        let file_size = file
            .metadata()
            .map_err(|source| QueryError::Open {
                path: path.display().to_string(),
                source,
            })?
            .len();

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let metadata = builder.metadata();
        let file_metadata = metadata.file_metadata();
        let info = FileInfo {
            row_count: u64::try_from(file_metadata.num_rows()).unwrap_or(0),
            column_count: file_metadata.schema_descr().num_columns(),
            file_size,
            num_row_groups: metadata.num_row_groups(),
        };
        tracing::debug!(
            path = %path.display(),
            rows = info.row_count,
            row_groups = info.num_row_groups,
            "opened parquet log"
        );

        Ok(Self {
            path,
            info,
            batch_size: config.batch_size.max(1),
        })
    }

    /// Footer metadata captured at open; no data is read
    pub fn file_info(&self) -> &FileInfo {
        &self.info
    }

    pub fn row_count(&self) -> u64 {
        self.info.row_count
    }

    fn builder(&self) -> Result<ParquetRecordBatchReaderBuilder<File>, QueryError> {
        let file = open_file(&self.path)?;
        Ok(ParquetRecordBatchReaderBuilder::try_new(file)?.with_batch_size(self.batch_size))
    }

    /// Every row in storage order, one batch in memory at a time
    pub fn entries(&self) -> Result<ParquetEntries, QueryError> {
        Ok(BatchEntries::new(self.builder()?.build()?))
    }

    /// Collect the whole file. Memory grows with the file; prefer
    /// [`entries`](Self::entries) for anything large.
    pub fn read_all(&self) -> Result<Vec<ParquetLogEntry>, QueryError> {
        self.entries()?.collect()
    }

    /// Rows whose group contains `pattern`, ignoring case
    pub fn filter_by_group(
        &self,
        pattern: &str,
    ) -> Result<GroupFilter<ParquetEntries>, QueryError> {
        if pattern.is_empty() {
            return Err(QueryError::MissingPattern);
        }
        GroupFilter::new(self.entries()?, pattern)
    }

    /// Collecting form of [`filter_by_group`](Self::filter_by_group)
    pub fn filter_by_group_all(&self, pattern: &str) -> Result<Vec<ParquetLogEntry>, QueryError> {
        self.filter_by_group(pattern)?.collect()
    }

    /// Rows starting at zero-based `row`.
    ///
    /// Whole row groups before `row` are never read; the rest is skipped
    /// by the Parquet reader itself. Seeking to or past the end is an error.
    pub fn seek_to_row(&self, row: u64) -> Result<ParquetEntries, QueryError> {
        let row_count = self.info.row_count;
        if row >= row_count {
            return Err(QueryError::SeekOutOfRange { row, row_count });
        }

        let builder = self.builder()?;
        let metadata = builder.metadata().clone();

        let mut first_group = metadata.num_row_groups();
        let mut offset = row;
        for (i, group) in metadata.row_groups().iter().enumerate() {
            let rows = u64::try_from(group.num_rows()).unwrap_or(0);
            if offset < rows {
                first_group = i;
                break;
            }
            offset -= rows;
        }

        let row_groups: Vec<usize> = (first_group..metadata.num_row_groups()).collect();
        tracing::debug!(row, first_group, offset, "seeking parquet log");

        let reader = builder
            .with_row_groups(row_groups)
            .with_offset(usize::try_from(offset).unwrap_or(usize::MAX))
            .build()?;
        Ok(BatchEntries::new(reader))
    }

    /// The last `n` rows (all of them when the file is shorter)
    pub fn tail(&self, n: u64) -> Result<ParquetEntries, QueryError> {
        let row_count = self.info.row_count;
        if n == 0 || row_count == 0 {
            let reader = self.builder()?.with_row_groups(Vec::new()).build()?;
            return Ok(BatchEntries::new(reader));
        }
        self.seek_to_row(row_count - n.min(row_count))
    }

    /// Summaries of every group in the file, ordered by first timestamp
    pub fn list_groups(&self) -> Result<Vec<GroupInfo>, QueryError> {
        group_summaries(self.entries()?)
    }

    /// Run a named operation and gather its results and stats.
    ///
    /// Arguments are checked before any data is read. `by-group` stops
    /// scanning once `limit` matches are found; without a limit its memory
    /// grows with the number of matching rows.
    pub fn query(
        &self,
        operation: QueryOperation,
        pattern: Option<&str>,
        limit: Option<usize>,
    ) -> Result<QueryResult, QueryError> {
        let pattern = match (operation, pattern) {
            (QueryOperation::ByGroup, Some(p)) if !p.is_empty() => Some(p),
            (QueryOperation::ByGroup, _) => return Err(QueryError::MissingPattern),
            _ => None,
        };

        let start = Instant::now();
        let mut result = QueryResult::default();

        match operation {
            QueryOperation::ListGroups => {
                let mut total = 0u64;
                result.groups = group_summaries(self.entries()?.inspect(|_| total += 1))?;
                result.stats.total_entries = total;
                result.stats.matched_entries = total;
                result.stats.total_groups = result.groups.len() as u64;
            }
            QueryOperation::ByGroup => {
                let pattern = pattern.unwrap_or_default();
                result.entries = collect_matches(self.entries()?, pattern, limit)?;
                result.stats.total_entries = self.info.row_count;
                result.stats.matched_entries = result.entries.len() as u64;
            }
            QueryOperation::Info => {
                result.stats.total_entries = self.info.row_count;
                result.stats.matched_entries = self.info.row_count;
                result.info = Some(self.info.clone());
            }
        }

        result.stats.query_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            operation = %operation,
            matched = result.stats.matched_entries,
            elapsed_ms = result.stats.query_time_ms,
            "query finished"
        );
        Ok(result)
    }
}

fn open_file(path: &Path) -> Result<File, QueryError> {
    File::open(path).map_err(|source| QueryError::Open {
        path: path.display().to_string(),
        source,
    })
}
