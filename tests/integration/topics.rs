//! Topic files on disk.

use tempfile::TempDir;

use crate::common::{write_file, TOPICS_JSONL};
use hybridrank::{read_topics, ConfigError, TopicReader};

#[test]
fn reads_jsonl_topics() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "topics.jsonl", TOPICS_JSONL);

    let batch = read_topics::<String>(&[path], TopicReader::Jsonl, "title").unwrap();
    assert_eq!(batch.ids(), vec!["q1", "q2", "q3"]);
    assert_eq!(batch.get(&"q3".to_string()), Some("panda"));
}

#[test]
fn alternate_field() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "topics.jsonl", TOPICS_JSONL);

    let batch = read_topics::<String>(&[path], TopicReader::Jsonl, "description").unwrap();
    assert_eq!(batch.get(&"q1".to_string()), Some("habitat of black bears"));
}

#[test]
fn later_files_win() {
    let dir = TempDir::new().unwrap();
    let first = write_file(dir.path(), "a.tsv", "1\told text\n2\tkept\n");
    let second = write_file(dir.path(), "b.tsv", "1\tnew text\n3\tadded\n");

    let batch = read_topics::<u64>(&[first, second], TopicReader::Tsv, "title").unwrap();
    assert_eq!(batch.ids(), vec![1, 2, 3]);
    assert_eq!(batch.get(&1), Some("new text"));
    assert_eq!(batch.get(&2), Some("kept"));
}

#[test]
fn numeric_ids_sort_numerically() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "t.tsv", "10\tten\n9\tnine\n100\thundred\n");

    let numeric = read_topics::<u64>(&[path.clone()], TopicReader::Tsv, "title").unwrap();
    assert_eq!(numeric.ids(), vec![9, 10, 100]);

    let lexical = read_topics::<String>(&[path], TopicReader::Tsv, "title").unwrap();
    assert_eq!(lexical.ids(), vec!["10", "100", "9"]);
}

#[test]
fn missing_topics_file() {
    let dir = TempDir::new().unwrap();
    let err = read_topics::<String>(&[dir.path().join("nope.tsv")], TopicReader::Tsv, "title")
        .unwrap_err();
    assert!(matches!(err, ConfigError::TopicsNotFound { .. }));
}

#[test]
fn directory_is_not_a_topics_file() {
    let dir = TempDir::new().unwrap();
    let err = read_topics::<String>(&[dir.path().to_path_buf()], TopicReader::Jsonl, "title")
        .unwrap_err();
    assert!(matches!(err, ConfigError::TopicsNotFound { .. }));
}
