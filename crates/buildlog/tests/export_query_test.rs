//! End-to-end: parse a log, export it to Parquet, query it back.

use std::path::{Path, PathBuf};

use buildlog::config::{QueryConfig, StoreConfig};
use buildlog::query::{ParquetLogReader, QueryError, QueryOperation};
use buildlog::store::{export_entries, export_iter};
use buildlog::{LogEntry, ParquetLogEntry, Parser};

const BUILD_LOG: &str = "\x1b_bk;t=1745322209921\x07~~~ Running global environment hook\n\
\x1b_bk;t=1745322209950\x07$ /buildkite/hooks/environment\n\
\x1b_bk;t=1745322210000\x07~~~ Running tests\n\
\x1b_bk;t=1745322210010\x07$ npm test\n\
\x1b_bk;t=1745322210020\x07remote: Counting objects: 100% (54/54)\x1b[K\n\
\x1b_bk;t=1745322210030\x07\x1b[32m12 passing\x1b[0m\n\
\x1b_bk;t=1745322210100\x07~~~ Pre-environment cleanup\n\
\x1b_bk;t=1745322210110\x07$ rm -rf node_modules\n";

fn export_log(dir: &Path, log: &str, config: &StoreConfig) -> PathBuf {
    let path = dir.join("build.parquet");
    export_iter(Parser::new().entries(log.as_bytes()), &path, config).unwrap();
    path
}

fn contents(entries: &[ParquetLogEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.content.as_str()).collect()
}

#[test]
fn export_then_read_preserves_rows_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let parsed: Vec<LogEntry> = Parser::new().parse_all(BUILD_LOG.as_bytes()).unwrap();
    let path = export_log(dir.path(), BUILD_LOG, &StoreConfig::default());

    let reader = ParquetLogReader::open(&path).unwrap();
    let rows = reader.read_all().unwrap();
    assert_eq!(rows.len(), parsed.len());

    for (row, entry) in rows.iter().zip(&parsed) {
        assert_eq!(row, &ParquetLogEntry::from(entry));
    }

    let header = &rows[0];
    assert_eq!(header.timestamp, 1_745_322_209_921);
    assert_eq!(header.content, "~~~ Running global environment hook");
    assert!(header.is_group);
    assert_eq!(header.group, header.content);

    assert!(rows[3].is_command);
    assert!(rows[4].is_progress);
    assert_eq!(rows[5].group, "~~~ Running tests");
}

#[test]
fn export_entries_matches_export_iter() {
    let dir = tempfile::tempdir().unwrap();
    let parsed = Parser::new().parse_all(BUILD_LOG.as_bytes()).unwrap();

    let one_shot = dir.path().join("one_shot.parquet");
    assert_eq!(export_entries(&parsed, &one_shot, &StoreConfig::default()).unwrap(), 8);
    let streamed = export_log(dir.path(), BUILD_LOG, &StoreConfig::default());

    let a = ParquetLogReader::open(&one_shot).unwrap().read_all().unwrap();
    let b = ParquetLogReader::open(&streamed).unwrap().read_all().unwrap();
    assert_eq!(a, b);
}

#[test]
fn group_summary_of_running_tests() {
    let dir = tempfile::tempdir().unwrap();
    let log = "~~~ Running tests\n$ npm test\n--- Build complete\n";
    let path = export_log(dir.path(), log, &StoreConfig::default());

    let reader = ParquetLogReader::open(&path).unwrap();
    let groups: Vec<String> = reader.read_all().unwrap().into_iter().map(|e| e.group).collect();
    assert_eq!(groups, vec!["~~~ Running tests", "~~~ Running tests", "--- Build complete"]);

    let summaries = reader.list_groups().unwrap();
    let tests = summaries.iter().find(|g| g.name == "~~~ Running tests").unwrap();
    assert_eq!(tests.entry_count, 2);
    assert_eq!(tests.commands, 1);
}

#[test]
fn group_summaries_ordered_by_first_seen() {
    let dir = tempfile::tempdir().unwrap();
    let path = export_log(dir.path(), BUILD_LOG, &StoreConfig::default());
    let groups = ParquetLogReader::open(&path).unwrap().list_groups().unwrap();

    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "~~~ Running global environment hook",
            "~~~ Running tests",
            "~~~ Pre-environment cleanup",
        ]
    );
    assert_eq!(groups[1].entry_count, 4);
    assert_eq!(groups[1].progress, 1);
    assert_eq!(groups[1].first_seen, 1_745_322_210_000);
    assert_eq!(groups[1].last_seen, 1_745_322_210_030);
}

#[test]
fn filter_by_environment_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let log = "~~~ Running global environment hook\n\
               ~~~ Running tests\n\
               ~~~ Pre-environment cleanup\n";
    let path = export_log(dir.path(), log, &StoreConfig::default());
    let reader = ParquetLogReader::open(&path).unwrap();

    let matched = reader.filter_by_group_all("environment").unwrap();
    assert_eq!(
        contents(&matched),
        vec!["~~~ Running global environment hook", "~~~ Pre-environment cleanup"]
    );

    let streamed: Vec<ParquetLogEntry> = reader
        .filter_by_group("ENVIRONMENT")
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(streamed, matched);
}

#[test]
fn filter_requires_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let path = export_log(dir.path(), BUILD_LOG, &StoreConfig::default());
    let reader = ParquetLogReader::open(&path).unwrap();
    assert!(matches!(reader.filter_by_group(""), Err(QueryError::MissingPattern)));
}

#[test]
fn streaming_scan_equals_read_all() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        batch_size: 3,
        max_row_group_size: 3,
        ..StoreConfig::default()
    };
    let path = export_log(dir.path(), BUILD_LOG, &config);
    let reader = ParquetLogReader::open_with(&path, &QueryConfig { batch_size: 2 }).unwrap();

    let streamed: Vec<ParquetLogEntry> = reader.entries().unwrap().map(Result::unwrap).collect();
    assert_eq!(streamed, reader.read_all().unwrap());
    assert_eq!(reader.file_info().num_row_groups, 3);
}

#[test]
fn seek_equivalence_across_row_groups() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        max_row_group_size: 3,
        ..StoreConfig::default()
    };
    let path = export_log(dir.path(), BUILD_LOG, &config);
    let reader = ParquetLogReader::open(&path).unwrap();
    let all = reader.read_all().unwrap();

    let first: Vec<ParquetLogEntry> = reader
        .seek_to_row(0)
        .unwrap()
        .take(5)
        .map(Result::unwrap)
        .collect();
    assert_eq!(first, all[..5]);

    let from_four: Vec<ParquetLogEntry> =
        reader.seek_to_row(4).unwrap().map(Result::unwrap).collect();
    assert_eq!(from_four, all[4..]);
}

#[test]
fn seek_past_end_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = export_log(dir.path(), BUILD_LOG, &StoreConfig::default());
    let reader = ParquetLogReader::open(&path).unwrap();

    match reader.seek_to_row(8) {
        Err(QueryError::SeekOutOfRange { row, row_count }) => {
            assert_eq!(row, 8);
            assert_eq!(row_count, 8);
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("seek past the end should fail"),
    }
}

#[test]
fn tail_returns_last_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = export_log(dir.path(), BUILD_LOG, &StoreConfig::default());
    let reader = ParquetLogReader::open(&path).unwrap();

    let last: Vec<ParquetLogEntry> = reader.tail(2).unwrap().map(Result::unwrap).collect();
    assert_eq!(contents(&last), vec!["~~~ Pre-environment cleanup", "$ rm -rf node_modules"]);
}

#[test]
fn file_info_from_footer() {
    let dir = tempfile::tempdir().unwrap();
    let path = export_log(dir.path(), BUILD_LOG, &StoreConfig::default());
    let reader = ParquetLogReader::open(&path).unwrap();

    let info = reader.file_info();
    assert_eq!(info.row_count, 8);
    assert_eq!(info.column_count, 8);
    assert_eq!(info.num_row_groups, 1);
    assert_eq!(info.file_size, std::fs::metadata(&path).unwrap().len());
}

#[test]
fn query_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = export_log(dir.path(), BUILD_LOG, &StoreConfig::default());
    let reader = ParquetLogReader::open(&path).unwrap();

    let op: QueryOperation = "by-group".parse().unwrap();
    let result = reader.query(op, Some("tests"), None).unwrap();
    assert_eq!(result.stats.total_entries, 8);
    assert_eq!(result.stats.matched_entries, 4);
    assert!(result.groups.is_empty());

    let limited = reader.query(op, Some("tests"), Some(1)).unwrap();
    assert_eq!(limited.entries.len(), 1);
    assert_eq!(limited.entries[0], result.entries[0]);
    assert_eq!(limited.stats.total_entries, 8);

    let info = reader.query(QueryOperation::Info, None, None).unwrap();
    assert_eq!(info.info.as_ref().map(|i| i.row_count), Some(8));
}

#[test]
fn missing_file_fails_at_open() {
    let dir = tempfile::tempdir().unwrap();
    let err = ParquetLogReader::open(dir.path().join("missing.parquet")).unwrap_err();
    assert!(matches!(err, QueryError::Open { .. }));
}

#[test]
fn timestampless_lines_use_zero_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let log = "Regular log line without timestamp\n";
    let path = export_log(dir.path(), log, &StoreConfig::default());
    let rows = ParquetLogReader::open(&path).unwrap().read_all().unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].timestamp, 0);
    assert!(!rows[0].has_timestamp);
    assert_eq!(rows[0].content, "Regular log line without timestamp");
    assert_eq!(rows[0].group, "");
}
