// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types, one enum per layer.
//!
//! The split follows when each failure can happen:
//!
//! | Enum             | Raised                          | Scope                |
//! |------------------|---------------------------------|----------------------|
//! | `ConfigError`    | before any retrieval starts     | whole run            |
//! | `RetrievalError` | inside a retriever adapter      | whole batch          |
//! | `FusionError`    | while fusing one query          | that query only      |
//! | `OutputError`    | while writing the run file      | output only          |
//! | `BatchError`     | while setting up the worker pool| whole batch          |
//!
//! `FusionError` is never propagated with `?` out of a batch. The coordinator
//! collects it per query id so sibling queries still produce results.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Side;

/// Result type for fallible operations that cross layers.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for the search-and-fuse pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Malformed configuration or topic input. Reported before any work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("alpha must be finite and >= 0, got {0}")]
    InvalidAlpha(f64),

    #[error("hit count must be >= 1")]
    ZeroHits,

    #[error("thread count must be >= 1")]
    ZeroThreads,

    #[error("\"{}\" does not refer to a readable topics file", path.display())]
    TopicsNotFound { path: PathBuf },

    #[error("failed to read topics from {}: {source}", path.display())]
    TopicRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: malformed topic: {reason}", path.display())]
    MalformedTopic {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{}: query id \"{qid}\" is not valid for the selected query id type", path.display())]
    InvalidQueryId { path: PathBuf, qid: String },

    #[error("{}: unable to read topic field \"{field}\" for query {qid}", path.display())]
    MissingTopicField {
        path: PathBuf,
        qid: String,
        field: String,
    },

    #[error("unknown topic reader \"{0}\" (expected tsv or jsonl)")]
    UnknownTopicReader(String),

    #[error("unknown run format \"{0}\" (expected trec or msmarco)")]
    UnknownRunFormat(String),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{ids} query ids but {queries} queries")]
    QueryCountMismatch { ids: usize, queries: usize },
}

/// Failure to fuse a single query. Isolated to that query id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FusionError {
    #[error("{side} retriever returned no hits")]
    EmptyRankedList { side: Side },

    #[error("no {side} result for this query")]
    MissingRetrievalResult { side: Side },

    #[error("batch cancelled before this query was fused")]
    Cancelled,
}

/// A ranked list contained the same docid twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate docid \"{docid}\" in ranked list")]
pub struct DuplicateDocid {
    pub docid: String,
}

/// Failure inside a retriever adapter.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("failed to read run file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(
        "{}:{line}: query id \"{qid}\" is not valid for the selected query id type",
        path.display()
    )]
    InvalidQueryId {
        path: PathBuf,
        line: usize,
        qid: String,
    },

    #[cfg(feature = "parallel")]
    #[error("failed to build retrieval thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failure setting up batch execution.
#[derive(Debug, Error)]
pub enum BatchError {
    #[cfg(feature = "parallel")]
    #[error("failed to build fusion thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("fusion worker pool requested with zero threads")]
    ZeroThreads,
}

/// Failure persisting a fused run. In-memory results are unaffected.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write run to {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },
}
