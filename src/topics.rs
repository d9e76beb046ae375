// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Topic loading: files on disk → [`QueryBatch`].
//!
//! Two readers:
//!
//! | Reader  | Line format                               | Query text          |
//! |---------|-------------------------------------------|---------------------|
//! | `tsv`   | `qid<TAB>text`                            | second column       |
//! | `jsonl` | `{"qid": ..., "title": ..., ...}`         | the selected field  |
//!
//! JSONL topics may use `id` instead of `qid`, and the id may be a string or
//! a number. Every failure here is a [`ConfigError`]: topics are read before
//! any retrieval work starts.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ConfigError;
use crate::types::QueryBatch;

/// Topic field used as the query when none is configured.
pub const DEFAULT_TOPIC_FIELD: &str = "title";

/// Topic file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicReader {
    Tsv,
    #[default]
    Jsonl,
}

impl FromStr for TopicReader {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" => Ok(TopicReader::Tsv),
            "jsonl" | "json" => Ok(TopicReader::Jsonl),
            _ => Err(ConfigError::UnknownTopicReader(s.to_string())),
        }
    }
}

impl fmt::Display for TopicReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicReader::Tsv => f.write_str("tsv"),
            TopicReader::Jsonl => f.write_str("jsonl"),
        }
    }
}

/// Read and merge topic files. Later files win for repeated query ids.
pub fn read_topics<K>(
    paths: &[PathBuf],
    reader: TopicReader,
    field: &str,
) -> Result<QueryBatch<K>, ConfigError>
where
    K: Ord + Clone + FromStr,
{
    let mut batch = QueryBatch::new();
    for path in paths {
        let topics = read_topic_file(path, reader, field)?;
        debug!(path = %path.display(), topics = topics.len(), %reader, "read topics");
        batch.extend(topics);
    }
    Ok(batch)
}

/// Read a single topic file.
pub fn read_topic_file<K>(
    path: &Path,
    reader: TopicReader,
    field: &str,
) -> Result<QueryBatch<K>, ConfigError>
where
    K: Ord + Clone + FromStr,
{
    if !path.is_file() {
        return Err(ConfigError::TopicsNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::TopicRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_topics(&text, path, reader, field)
}

/// Parse topic file contents. `path` is only used in error messages.
pub fn parse_topics<K>(
    text: &str,
    path: &Path,
    reader: TopicReader,
    field: &str,
) -> Result<QueryBatch<K>, ConfigError>
where
    K: Ord + Clone + FromStr,
{
    let mut batch = QueryBatch::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let malformed = |reason: String| ConfigError::MalformedTopic {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        };

        let (qid, query) = match reader {
            TopicReader::Tsv => {
                let (qid, text) = line
                    .split_once('\t')
                    .ok_or_else(|| malformed("expected qid<TAB>text".to_string()))?;
                (qid.trim().to_string(), text.trim().to_string())
            }
            TopicReader::Jsonl => {
                let topic: Map<String, Value> =
                    serde_json::from_str(line).map_err(|e| malformed(e.to_string()))?;
                let qid = topic_id(&topic)
                    .ok_or_else(|| malformed("missing \"qid\" or \"id\"".to_string()))?;
                let query = match topic.get(field) {
                    Some(Value::String(text)) => text.clone(),
                    _ => {
                        return Err(ConfigError::MissingTopicField {
                            path: path.to_path_buf(),
                            qid,
                            field: field.to_string(),
                        })
                    }
                };
                (qid, query)
            }
        };

        let key = qid.parse::<K>().map_err(|_| ConfigError::InvalidQueryId {
            path: path.to_path_buf(),
            qid: qid.clone(),
        })?;
        batch.insert(key, query);
    }

    Ok(batch)
}

fn topic_id(topic: &Map<String, Value>) -> Option<String> {
    match topic.get("qid").or_else(|| topic.get("id"))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
