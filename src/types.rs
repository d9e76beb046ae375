// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Core data types: scored documents, ranked lists, query batches.
//!
//! Everything here is plain data. A `RankedList` is created fresh by a
//! retriever for one (query, source) pair, moved into fusion, and replaced by
//! the fused list. Nothing is shared between queries.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DuplicateDocid;

// =============================================================================
// SCORED DOCUMENTS
// =============================================================================

/// One retrieval hit: a document id and its relevance score.
///
/// Higher scores mean more relevant. Which retriever produced the hit is
/// implied by the list it lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub docid: String,
    pub score: f32,
}

impl ScoredDoc {
    pub fn new(docid: impl Into<String>, score: f32) -> Self {
        Self {
            docid: docid.into(),
            score,
        }
    }
}

/// Which retriever a list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Sparse,
    Dense,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Sparse => f.write_str("sparse"),
            Side::Dense => f.write_str("dense"),
        }
    }
}

// =============================================================================
// RANKED LISTS
// =============================================================================

/// An ordered sequence of scored documents for one query from one source.
///
/// **Invariant**: docids are unique within the list. Construction through
/// [`RankedList::from_docs`] checks it; fusion output satisfies it by
/// construction.
///
/// No ordering is assumed. Retrievers usually hand lists over best-first,
/// but fusion computes its own minimum and its own final order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedList {
    docs: Vec<ScoredDoc>,
}

impl RankedList {
    /// Empty list. Valid to build, rejected by fusion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list, rejecting duplicate docids.
    pub fn from_docs(docs: Vec<ScoredDoc>) -> Result<Self, DuplicateDocid> {
        let mut seen = HashSet::with_capacity(docs.len());
        for doc in &docs {
            if !seen.insert(doc.docid.as_str()) {
                return Err(DuplicateDocid {
                    docid: doc.docid.clone(),
                });
            }
        }
        Ok(Self { docs })
    }

    /// Build a list from `(docid, score)` pairs, rejecting duplicate docids.
    pub fn from_pairs<S, I>(pairs: I) -> Result<Self, DuplicateDocid>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, f32)>,
    {
        Self::from_docs(
            pairs
                .into_iter()
                .map(|(docid, score)| ScoredDoc::new(docid, score))
                .collect(),
        )
    }

    /// Wrap docs the caller already knows to be unique.
    pub(crate) fn from_unique(docs: Vec<ScoredDoc>) -> Self {
        debug_assert!(
            Self::from_docs(docs.clone()).is_ok(),
            "from_unique called with duplicate docids"
        );
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredDoc> {
        self.docs.iter()
    }

    pub fn as_slice(&self) -> &[ScoredDoc] {
        &self.docs
    }

    pub fn into_vec(self) -> Vec<ScoredDoc> {
        self.docs
    }

    /// Look up a document's score by docid. O(n).
    pub fn score_of(&self, docid: &str) -> Option<f32> {
        self.docs
            .iter()
            .find(|d| d.docid == docid)
            .map(|d| d.score)
    }

    /// Minimum score in the list, `None` when empty.
    ///
    /// NaN scores are ignored unless every score is NaN.
    pub fn min_score(&self) -> Option<f32> {
        let mut scores = self.docs.iter().map(|d| d.score);
        let first = scores.next()?;
        Some(scores.fold(first, f32::min))
    }

    /// Docids in list order.
    pub fn docids(&self) -> impl Iterator<Item = &str> {
        self.docs.iter().map(|d| d.docid.as_str())
    }
}

impl IntoIterator for RankedList {
    type Item = ScoredDoc;
    type IntoIter = std::vec::IntoIter<ScoredDoc>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a ScoredDoc;
    type IntoIter = std::slice::Iter<'a, ScoredDoc>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

impl<'de> Deserialize<'de> for RankedList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let docs = Vec::<ScoredDoc>::deserialize(deserializer)?;
        Self::from_docs(docs).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// QUERY BATCHES AND RESULTS
// =============================================================================

/// Fused lists keyed by query id, in query id order.
pub type FusionResult<K> = BTreeMap<K, RankedList>;

/// Query id → query text, ordered by query id.
///
/// Built once from topic input and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBatch<K: Ord> {
    queries: BTreeMap<K, String>,
}

impl<K: Ord> Default for QueryBatch<K> {
    fn default() -> Self {
        Self {
            queries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> QueryBatch<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a query, replacing any earlier text for the same id.
    pub fn insert(&mut self, qid: K, text: impl Into<String>) -> Option<String> {
        self.queries.insert(qid, text.into())
    }

    pub fn get(&self, qid: &K) -> Option<&str> {
        self.queries.get(qid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Query ids in order.
    pub fn ids(&self) -> Vec<K> {
        self.queries.keys().cloned().collect()
    }

    /// Query texts, aligned with [`QueryBatch::ids`].
    pub fn texts(&self) -> Vec<String> {
        self.queries.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &str)> {
        self.queries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Merge another batch in. Entries from `other` win on conflicts.
    pub fn extend(&mut self, other: QueryBatch<K>) {
        self.queries.extend(other.queries);
    }
}

impl<K: Ord, S: Into<String>> FromIterator<(K, S)> for QueryBatch<K> {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        Self {
            queries: iter.into_iter().map(|(k, s)| (k, s.into())).collect(),
        }
    }
}
