use arrow::array::{Array, BooleanArray, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReader;

use crate::store::schema::{
    COL_CONTENT, COL_GROUP, COL_HAS_TIMESTAMP, COL_IS_COMMAND, COL_IS_GROUP, COL_IS_PROGRESS,
    COL_RAW_LINE_SIZE, COL_TIMESTAMP,
};
use crate::store::ParquetLogEntry;

use super::model::QueryError;

/// Rows of a Parquet file, decoded batch by batch
pub type ParquetEntries = BatchEntries<ParquetRecordBatchReader>;

/// Column positions, resolved once from the first batch's schema
#[derive(Debug, Clone, Copy)]
struct ColumnMapping {
    timestamp: usize,
    content: usize,
    group: Option<usize>,
    has_timestamp: Option<usize>,
    is_command: Option<usize>,
    is_group: Option<usize>,
    is_progress: Option<usize>,
    raw_line_size: Option<usize>,
}

impl ColumnMapping {
    fn from_schema(schema: &Schema) -> Result<Self, QueryError> {
        let index = |name: &str| schema.index_of(name).ok();

        let (timestamp, content) = match (index(COL_TIMESTAMP), index(COL_CONTENT)) {
            (Some(t), Some(c)) => (t, c),
            (t, c) => {
                let mut missing = Vec::new();
                if t.is_none() {
                    missing.push(COL_TIMESTAMP);
                }
                if c.is_none() {
                    missing.push(COL_CONTENT);
                }
                return Err(QueryError::MissingColumns(missing));
            }
        };

        Ok(Self {
            timestamp,
            content,
            group: index(COL_GROUP),
            has_timestamp: index(COL_HAS_TIMESTAMP),
            is_command: index(COL_IS_COMMAND),
            is_group: index(COL_IS_GROUP),
            is_progress: index(COL_IS_PROGRESS),
            raw_line_size: index(COL_RAW_LINE_SIZE),
        })
    }
}

/// Typed views of one batch's columns. Optional columns that the file
/// lacks read back as their default value.
struct BatchColumns {
    len: usize,
    timestamp: Int64Array,
    content: StringArray,
    group: Option<StringArray>,
    has_timestamp: Option<BooleanArray>,
    is_command: Option<BooleanArray>,
    is_group: Option<BooleanArray>,
    is_progress: Option<BooleanArray>,
    raw_line_size: Option<Int32Array>,
}

impl BatchColumns {
    fn new(batch: &RecordBatch, mapping: &ColumnMapping) -> Result<Self, QueryError> {
        Ok(Self {
            len: batch.num_rows(),
            timestamp: typed(batch, mapping.timestamp, COL_TIMESTAMP)?,
            content: typed(batch, mapping.content, COL_CONTENT)?,
            group: optional(batch, mapping.group, COL_GROUP)?,
            has_timestamp: optional(batch, mapping.has_timestamp, COL_HAS_TIMESTAMP)?,
            is_command: optional(batch, mapping.is_command, COL_IS_COMMAND)?,
            is_group: optional(batch, mapping.is_group, COL_IS_GROUP)?,
            is_progress: optional(batch, mapping.is_progress, COL_IS_PROGRESS)?,
            raw_line_size: optional(batch, mapping.raw_line_size, COL_RAW_LINE_SIZE)?,
        })
    }

    fn row(&self, i: usize) -> ParquetLogEntry {
        let flag = |col: &Option<BooleanArray>| {
            col.as_ref().is_some_and(|c| c.is_valid(i) && c.value(i))
        };

        ParquetLogEntry {
            timestamp: if self.timestamp.is_valid(i) { self.timestamp.value(i) } else { 0 },
            content: string_at(Some(&self.content), i),
            group: string_at(self.group.as_ref(), i),
            has_timestamp: flag(&self.has_timestamp),
            is_command: flag(&self.is_command),
            is_group: flag(&self.is_group),
            is_progress: flag(&self.is_progress),
            raw_line_size: self
                .raw_line_size
                .as_ref()
                .filter(|c| c.is_valid(i))
                .map_or(0, |c| c.value(i)),
        }
    }
}

fn string_at(col: Option<&StringArray>, i: usize) -> String {
    match col {
        Some(c) if c.is_valid(i) => c.value(i).to_string(),
        _ => String::new(),
    }
}

/// Arrays that a column of the given name must downcast to
trait ExpectedType: Array + Clone + 'static {
    const DATA_TYPE: DataType;
}

impl ExpectedType for Int64Array {
    const DATA_TYPE: DataType = DataType::Int64;
}

impl ExpectedType for Int32Array {
    const DATA_TYPE: DataType = DataType::Int32;
}

impl ExpectedType for StringArray {
    const DATA_TYPE: DataType = DataType::Utf8;
}

impl ExpectedType for BooleanArray {
    const DATA_TYPE: DataType = DataType::Boolean;
}

fn typed<A: ExpectedType>(
    batch: &RecordBatch,
    idx: usize,
    name: &'static str,
) -> Result<A, QueryError> {
    let column = batch.column(idx);
    column
        .as_any()
        .downcast_ref::<A>()
        .cloned()
        .ok_or_else(|| QueryError::ColumnType {
            column: name,
            expected: A::DATA_TYPE,
            actual: column.data_type().clone(),
        })
}

fn optional<A: ExpectedType>(
    batch: &RecordBatch,
    idx: Option<usize>,
    name: &'static str,
) -> Result<Option<A>, QueryError> {
    idx.map(|i| typed(batch, i, name)).transpose()
}

/// Lazy row iterator over any source of record batches.
///
/// - one batch is pulled only when the previous one is used up
/// - the column mapping comes from the first batch; a file without
///   `timestamp` or `content` fails there with `MissingColumns`
/// - any error is yielded once and ends the iteration
///
/// Memory use is one batch regardless of file size.
pub struct BatchEntries<I> {
    batches: I,
    mapping: Option<ColumnMapping>,
    current: Option<BatchColumns>,
    row: usize,
    finished: bool,
}

impl<I> BatchEntries<I>
where
    I: Iterator<Item = Result<RecordBatch, ArrowError>>,
{
    pub fn new(batches: I) -> Self {
        Self {
            batches,
            mapping: None,
            current: None,
            row: 0,
            finished: false,
        }
    }

    fn load(&mut self, batch: &RecordBatch) -> Result<(), QueryError> {
        let mapping = match self.mapping {
            Some(mapping) => mapping,
            None => {
                let mapping = ColumnMapping::from_schema(batch.schema().as_ref())?;
                self.mapping = Some(mapping);
                mapping
            }
        };
        self.current = Some(BatchColumns::new(batch, &mapping)?);
        self.row = 0;
        tracing::trace!(rows = batch.num_rows(), "decoding record batch");
        Ok(())
    }

    fn fail(&mut self, err: QueryError) -> Option<Result<ParquetLogEntry, QueryError>> {
        self.finished = true;
        self.current = None;
        Some(Err(err))
    }
}

impl<I> Iterator for BatchEntries<I>
where
    I: Iterator<Item = Result<RecordBatch, ArrowError>>,
{
    type Item = Result<ParquetLogEntry, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(columns) = &self.current {
                if self.row < columns.len {
                    let entry = columns.row(self.row);
                    self.row += 1;
                    return Some(Ok(entry));
                }
            }
            self.current = None;

            match self.batches.next() {
                None => {
                    self.finished = true;
                    return None;
                }
                Some(Err(e)) => return self.fail(e.into()),
                Some(Ok(batch)) => {
                    if let Err(e) = self.load(&batch) {
                        return self.fail(e);
                    }
                }
            }
        }
    }
}

impl<I> std::iter::FusedIterator for BatchEntries<I> where
    I: Iterator<Item = Result<RecordBatch, ArrowError>>
{
}
