use crate::store::ParquetLogEntry;

use super::model::QueryError;

/// Case-insensitive substring match on the entry's group.
///
/// Entries without a group match as `<no group>`, so a pattern such as
/// `"no"` also selects them.
pub fn group_matches(entry: &ParquetLogEntry, pattern_lower: &str) -> bool {
    entry.group_name().to_lowercase().contains(pattern_lower)
}

/// Keeps the entries whose group matches a pattern. Errors from the inner
/// iterator pass through untouched.
pub struct GroupFilter<I> {
    inner: I,
    pattern: String,
}

impl<I> GroupFilter<I>
where
    I: Iterator<Item = Result<ParquetLogEntry, QueryError>>,
{
    pub fn new(inner: I, pattern: &str) -> Result<Self, QueryError> {
        if pattern.is_empty() {
            return Err(QueryError::MissingPattern);
        }
        Ok(Self {
            inner,
            pattern: pattern.to_lowercase(),
        })
    }
}

impl<I> Iterator for GroupFilter<I>
where
    I: Iterator<Item = Result<ParquetLogEntry, QueryError>>,
{
    type Item = Result<ParquetLogEntry, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        for item in self.inner.by_ref() {
            match item {
                Ok(entry) if !group_matches(&entry, &self.pattern) => continue,
                other => return Some(other),
            }
        }
        None
    }
}

/// Collect the entries whose group contains `pattern`, stopping as soon as
/// `limit` of them are found. Rows past that point are never pulled.
pub fn collect_matches<I>(
    entries: I,
    pattern: &str,
    limit: Option<usize>,
) -> Result<Vec<ParquetLogEntry>, QueryError>
where
    I: Iterator<Item = Result<ParquetLogEntry, QueryError>>,
{
    GroupFilter::new(entries, pattern)?
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
