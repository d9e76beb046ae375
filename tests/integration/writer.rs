//! Run writer against real files.

use std::fs;

use tempfile::TempDir;

use crate::common::ranked;
use hybridrank::{FusionResult, OutputError, RunFormat, RunWriter};

fn sample() -> FusionResult<String> {
    let mut results = FusionResult::new();
    results.insert("q2".to_string(), ranked(&[("d9", 9.5)]));
    results.insert("q1".to_string(), ranked(&[("d1", 28.0), ("d2", 6.0)]));
    results
}

#[test]
fn writes_trec_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fused.trec");

    let mut writer = RunWriter::create(&path, RunFormat::Trec, "hybrid").unwrap();
    writer.write_all(&sample()).unwrap();
    writer.finish().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "q1 Q0 d1 1 28.000000 hybrid\n\
         q1 Q0 d2 2 6.000000 hybrid\n\
         q2 Q0 d9 1 9.500000 hybrid\n"
    );
}

#[test]
fn writes_msmarco_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fused.tsv");

    let mut writer = RunWriter::create(&path, RunFormat::Msmarco, "ignored").unwrap();
    writer.write_all(&sample()).unwrap();
    writer.finish().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "q1\td1\t1\nq1\td2\t2\nq2\td9\t1\n"
    );
}

#[test]
fn truncates_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fused.trec");
    fs::write(&path, "stale content\n".repeat(100)).unwrap();

    let mut writer = RunWriter::create(&path, RunFormat::Msmarco, "t").unwrap();
    writer.write_all(&sample()).unwrap();
    writer.finish().unwrap();

    assert!(!fs::read_to_string(&path).unwrap().contains("stale"));
}

#[test]
fn unwritable_target_leaves_results_intact() {
    let dir = TempDir::new().unwrap();
    let results = sample();

    // A directory cannot be opened as a file
    let err = RunWriter::create(dir.path(), RunFormat::Trec, "t").err();
    assert!(matches!(err, Some(OutputError::Create { .. })));

    let retry = dir.path().join("retry.trec");
    let mut writer = RunWriter::create(&retry, RunFormat::Trec, "t").unwrap();
    writer.write_all(&results).unwrap();
    writer.finish().unwrap();
    assert_eq!(fs::read_to_string(retry).unwrap().lines().count(), 3);
}
