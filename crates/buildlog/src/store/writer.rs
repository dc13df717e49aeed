use std::fs::File;
use std::io::Write;
use std::path::Path;

use arrow::datatypes::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression as ParquetCompression, ZstdLevel};
use parquet::file::properties::WriterProperties;

use crate::config::{Compression, StoreConfig};
use crate::parser::LogEntry;
use crate::stream::StreamError;

use super::schema::{log_schema, to_record_batch, ParquetLogEntry};
use super::StoreError;

/// Buffered Parquet writer for log entries.
///
/// Rows are accumulated until `batch_size` and then handed to the Parquet
/// writer as one record batch. Call [`finish`](Self::finish) to flush the
/// remainder and write the footer; a writer dropped before that closes its
/// sink but leaves an unreadable file behind.
pub struct ParquetLogWriter<W: Write + Send> {
    writer: ArrowWriter<W>,
    schema: SchemaRef,
    buffer: Vec<ParquetLogEntry>,
    batch_size: usize,
    rows_written: u64,
}

impl ParquetLogWriter<File> {
    /// Create (or truncate) `path` and write to it
    pub fn create(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| StoreError::Create {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "created parquet export");
        Self::new(file, config)
    }
}

impl<W: Write + Send> ParquetLogWriter<W> {
    pub fn new(sink: W, config: &StoreConfig) -> Result<Self, StoreError> {
        let schema = log_schema();
        let writer = ArrowWriter::try_new(sink, schema.clone(), Some(writer_properties(config)))?;
        let batch_size = config.batch_size.max(1);

        Ok(Self {
            writer,
            schema,
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            rows_written: 0,
        })
    }

    /// Buffer one entry, flushing when the buffer reaches `batch_size`
    pub fn write_entry(&mut self, entry: LogEntry) -> Result<(), StoreError> {
        self.write_row(ParquetLogEntry::from(entry))
    }

    pub fn write_row(&mut self, row: ParquetLogEntry) -> Result<(), StoreError> {
        self.buffer.push(row);
        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Write a slice of entries, in chunks of at most `batch_size` rows.
    /// Anything already buffered is written first so row order is kept.
    pub fn write_batch(&mut self, entries: &[LogEntry]) -> Result<(), StoreError> {
        self.flush()?;
        for chunk in entries.chunks(self.batch_size) {
            let rows: Vec<ParquetLogEntry> = chunk.iter().map(ParquetLogEntry::from).collect();
            self.write_rows(&rows)?;
        }
        Ok(())
    }

    /// Hand buffered rows to the Parquet writer
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let rows = std::mem::take(&mut self.buffer);
        self.write_rows(&rows)?;
        self.buffer = rows;
        self.buffer.clear();
        Ok(())
    }

    fn write_rows(&mut self, rows: &[ParquetLogEntry]) -> Result<(), StoreError> {
        let batch = to_record_batch(&self.schema, rows)?;
        self.writer.write(&batch)?;
        self.rows_written += rows.len() as u64;
        tracing::trace!(rows = rows.len(), total = self.rows_written, "wrote record batch");
        Ok(())
    }

    /// Rows handed to the Parquet writer so far (buffered rows excluded)
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush, write the footer and close. Returns the number of rows written.
    pub fn finish(mut self) -> Result<u64, StoreError> {
        self.flush()?;
        self.writer.close()?;
        tracing::debug!(rows = self.rows_written, "closed parquet export");
        Ok(self.rows_written)
    }

    /// Like [`finish`](Self::finish) but hands the sink back
    pub fn into_inner(mut self) -> Result<W, StoreError> {
        self.flush()?;
        Ok(self.writer.into_inner()?)
    }
}

fn writer_properties(config: &StoreConfig) -> WriterProperties {
    let compression = match config.compression {
        Compression::None => ParquetCompression::UNCOMPRESSED,
        Compression::Snappy => ParquetCompression::SNAPPY,
        Compression::Zstd => ParquetCompression::ZSTD(ZstdLevel::default()),
    };
    WriterProperties::builder()
        .set_compression(compression)
        .set_max_row_group_size(config.max_row_group_size.max(1))
        .build()
}

/// Write a slice of entries to `path` in one go.
pub fn export_entries(
    entries: &[LogEntry],
    path: impl AsRef<Path>,
    config: &StoreConfig,
) -> Result<u64, StoreError> {
    let mut writer = ParquetLogWriter::create(path, config)?;
    writer.write_batch(entries)?;
    writer.finish()
}

/// Drain an entry iterator into `path`, holding at most one batch in memory.
///
/// The first error from the iterator aborts the export; the rows before it
/// are not recovered. Use [`export_iter_filtered`] to skip entries instead.
pub fn export_iter<I>(
    iter: I,
    path: impl AsRef<Path>,
    config: &StoreConfig,
) -> Result<u64, StoreError>
where
    I: IntoIterator<Item = Result<LogEntry, StreamError>>,
{
    export_iter_filtered(iter, path, config, |_| true)
}

/// [`export_iter`] keeping only the entries `filter` accepts.
pub fn export_iter_filtered<I, F>(
    iter: I,
    path: impl AsRef<Path>,
    config: &StoreConfig,
    mut filter: F,
) -> Result<u64, StoreError>
where
    I: IntoIterator<Item = Result<LogEntry, StreamError>>,
    F: FnMut(&LogEntry) -> bool,
{
    let mut writer = ParquetLogWriter::create(path, config)?;
    for entry in iter {
        let entry = entry?;
        if filter(&entry) {
            writer.write_entry(entry)?;
        }
    }
    writer.finish()
}
