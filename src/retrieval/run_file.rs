// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A retriever backed by a precomputed run file.
//!
//! The usual way to fuse two existing systems is to fuse their run files.
//! `RunFileRetriever` loads one file into memory and answers batch searches
//! from it, so it can stand in for either side.
//!
//! Accepted line formats (whitespace separated, `#` starts a comment line):
//!
//! ```text
//! qid Q0 docid rank score tag     # TREC, six columns
//! qid docid rank                  # MS MARCO, three columns, score = 1/rank
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use super::{DenseRetriever, SparseRetriever};
use crate::error::RetrievalError;
use crate::fusion::sort_fused;
use crate::types::{RankedList, ScoredDoc};

/// In-memory run: query id (display form) → hits in file order.
#[derive(Debug, Clone)]
pub struct RunFileRetriever {
    path: PathBuf,
    runs: HashMap<String, Vec<ScoredDoc>>,
    threads: usize,
}

impl RunFileRetriever {
    /// Load a run file from disk, keeping query ids as written.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        Self::open_as::<String>(path)
    }

    /// Load a run file whose query ids are read as `K`.
    ///
    /// Lookups go through `K`'s display form, so ids spelled differently in
    /// the file (`007` for `7`) still match.
    pub fn open_as<K>(path: impl AsRef<Path>) -> Result<Self, RetrievalError>
    where
        K: FromStr + Display,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RetrievalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_as::<K>(&text, path)
    }

    /// Parse run file contents. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: impl Into<PathBuf>) -> Result<Self, RetrievalError> {
        Self::parse_as::<String>(text, origin)
    }

    /// Parse run file contents, reading query ids as `K`.
    pub fn parse_as<K>(text: &str, origin: impl Into<PathBuf>) -> Result<Self, RetrievalError>
    where
        K: FromStr + Display,
    {
        let path = origin.into();
        let mut runs: HashMap<String, Vec<ScoredDoc>> = HashMap::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut lines = 0usize;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let (qid, docid, score) = parse_line(trimmed).map_err(|reason| {
                RetrievalError::Parse {
                    path: path.clone(),
                    line: line_no,
                    reason,
                }
            })?;

            let qid = qid
                .parse::<K>()
                .map_err(|_| RetrievalError::InvalidQueryId {
                    path: path.clone(),
                    line: line_no,
                    qid: qid.to_string(),
                })?
                .to_string();

            if !seen.insert((qid.clone(), docid.to_string())) {
                warn!(
                    path = %path.display(),
                    line = line_no,
                    %qid,
                    docid,
                    "duplicate hit in run file; keeping first"
                );
                continue;
            }

            runs.entry(qid)
                .or_default()
                .push(ScoredDoc::new(docid, score));
            lines += 1;
        }

        debug!(
            path = %path.display(),
            queries = runs.len(),
            hits = lines,
            "loaded run file"
        );

        Ok(Self {
            path,
            runs,
            threads: 1,
        })
    }

    /// Worker count used when this retriever serves the dense side.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of queries with at least one hit.
    pub fn query_count(&self) -> usize {
        self.runs.len()
    }

    /// Top `k` hits for one query id, best-first. Unknown ids give an empty list.
    pub fn top_k(&self, qid: &str, k: usize) -> RankedList {
        let mut hits = self.runs.get(qid).cloned().unwrap_or_default();
        sort_fused(&mut hits);
        hits.truncate(k);
        RankedList::from_unique(hits)
    }

    #[cfg(feature = "parallel")]
    fn search_all<K>(
        &self,
        query_ids: &[K],
        k: usize,
        threads: usize,
    ) -> Result<HashMap<K, RankedList>, RetrievalError>
    where
        K: Display + Hash + Eq + Clone + Send + Sync,
    {
        let search = |qid: &K| (qid.clone(), self.top_k(&qid.to_string(), k));
        if threads <= 1 {
            return Ok(query_ids.iter().map(search).collect());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        Ok(pool.install(|| query_ids.par_iter().map(search).collect()))
    }

    #[cfg(not(feature = "parallel"))]
    fn search_all<K>(
        &self,
        query_ids: &[K],
        k: usize,
        _threads: usize,
    ) -> Result<HashMap<K, RankedList>, RetrievalError>
    where
        K: Display + Hash + Eq + Clone + Send + Sync,
    {
        Ok(query_ids
            .iter()
            .map(|qid| (qid.clone(), self.top_k(&qid.to_string(), k)))
            .collect())
    }
}

/// Split one non-empty line into `(qid, docid, score)`.
fn parse_line(line: &str) -> Result<(&str, &str, f32), String> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    match cols.as_slice() {
        [qid, _q0, docid, _rank, score, _tag] => {
            let score: f32 = score
                .parse()
                .map_err(|_| format!("invalid score \"{score}\""))?;
            Ok((*qid, *docid, score))
        }
        [qid, docid, rank] => {
            let rank: usize = rank
                .parse()
                .ok()
                .filter(|r| *r >= 1)
                .ok_or_else(|| format!("invalid rank \"{rank}\""))?;
            Ok((*qid, *docid, 1.0 / rank as f32))
        }
        other => Err(format!(
            "expected 6 (TREC) or 3 (MS MARCO) columns, found {}",
            other.len()
        )),
    }
}

impl SparseRetriever for RunFileRetriever {
    fn batch_search(
        &self,
        query_ids: &[String],
        _queries: &[String],
        k: usize,
        threads: usize,
    ) -> Result<HashMap<String, RankedList>, RetrievalError> {
        self.search_all(query_ids, k, threads)
    }
}

impl<K> DenseRetriever<K> for RunFileRetriever
where
    K: Display + Hash + Eq + Clone + Send + Sync,
{
    fn batch_search(
        &self,
        query_ids: &[K],
        _queries: &[String],
        k: usize,
    ) -> Result<HashMap<K, RankedList>, RetrievalError> {
        self.search_all(query_ids, k, self.threads)
    }
}
