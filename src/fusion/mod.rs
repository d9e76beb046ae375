// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Score fusion for one query: sparse list + dense list → one top-k list.
//!
//! # The rule
//!
//! | Document appears in | Fused score                          |
//! |---------------------|--------------------------------------|
//! | both lists          | `sparse * (1 + alpha) + dense`       |
//! | sparse only         | `min(dense)`                         |
//! | dense only          | `min(sparse)`                        |
//!
//! A document found by only one retriever is anchored to the *other*
//! retriever's lowest observed score for this query, not to zero. That keeps
//! it inside the batch's score range instead of an arbitrary constant.
//!
//! Note the sparse-only row: the document's own sparse score is dropped and
//! replaced by the dense floor. This is the fusion policy, not a bug, and
//! there is no knob for it. Users comparing against raw BM25 orderings should
//! expect sparse-only documents to tie with each other.
//!
//! # Complexity
//!
//! O(n + m) to score (dense docids go into a hash map; each sparse doc is one
//! lookup), O((n + m) log(n + m)) to sort, where n and m are the list lengths.
//!
//! # Ordering
//!
//! See [`ranking`]. Scores descending, candidate order on ties.

pub mod ranking;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FusionError};
use crate::types::{RankedList, ScoredDoc, Side};

pub use ranking::{compare_fused, sort_fused};

/// Weight on the sparse contribution when no other value is configured.
pub const DEFAULT_ALPHA: f64 = 1.1;

/// Number of fused hits kept per query when no other value is configured.
pub const DEFAULT_HITS: usize = 1000;

/// Validated fusion parameters.
///
/// `alpha` is finite and non-negative; `k` is at least one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFusionParams")]
pub struct FusionParams {
    alpha: f64,
    k: usize,
}

#[derive(Deserialize)]
struct RawFusionParams {
    alpha: f64,
    k: usize,
}

impl TryFrom<RawFusionParams> for FusionParams {
    type Error = ConfigError;

    fn try_from(raw: RawFusionParams) -> Result<Self, Self::Error> {
        Self::new(raw.alpha, raw.k)
    }
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            k: DEFAULT_HITS,
        }
    }
}

impl FusionParams {
    pub fn new(alpha: f64, k: usize) -> Result<Self, ConfigError> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(ConfigError::InvalidAlpha(alpha));
        }
        if k == 0 {
            return Err(ConfigError::ZeroHits);
        }
        Ok(Self { alpha, k })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Same alpha, different hit count.
    pub fn with_k(self, k: usize) -> Result<Self, ConfigError> {
        Self::new(self.alpha, k)
    }
}

/// Score for a document both retrievers found.
///
/// Computed in `f64` because alpha is an `f64` weight, then narrowed.
#[inline]
pub fn combine_scores(sparse: f32, dense: f32, alpha: f64) -> f32 {
    let sparse = f64::from(sparse);
    (sparse + sparse * alpha + f64::from(dense)) as f32
}

/// Fuse one query's sparse and dense lists into a top-k list.
///
/// Both lists are consumed; the result is a new list of length
/// `min(k, |sparse ∪ dense|)` sorted best-first. Having fewer candidates than
/// `k` is not an error.
///
/// # Errors
///
/// `EmptyRankedList` when either side has no hits: the anchor score for
/// single-source documents is undefined over an empty list.
///
/// # Example
///
/// ```
/// use hybridrank::{fuse, FusionParams, RankedList};
///
/// let sparse = RankedList::from_pairs([("d1", 10.0), ("d2", 5.0)]).unwrap();
/// let dense = RankedList::from_pairs([("d1", 8.0), ("d3", 6.0)]).unwrap();
/// let fused = fuse(sparse, dense, FusionParams::new(1.0, 3).unwrap()).unwrap();
///
/// let ranked: Vec<_> = fused.iter().map(|d| (d.docid.as_str(), d.score)).collect();
/// assert_eq!(ranked, vec![("d1", 28.0), ("d2", 6.0), ("d3", 5.0)]);
/// ```
pub fn fuse(
    sparse: RankedList,
    dense: RankedList,
    params: FusionParams,
) -> Result<RankedList, FusionError> {
    let min_sparse = sparse
        .min_score()
        .ok_or(FusionError::EmptyRankedList { side: Side::Sparse })?;
    let min_dense = dense
        .min_score()
        .ok_or(FusionError::EmptyRankedList { side: Side::Dense })?;

    let dense = dense.into_vec();

    // Unconsumed dense docs. A match removes its entry so the doc is
    // emitted once, through the sparse side.
    let mut unmatched: HashMap<&str, f32> = dense
        .iter()
        .map(|d| (d.docid.as_str(), d.score))
        .collect();

    let mut candidates: Vec<ScoredDoc> = Vec::with_capacity(sparse.len() + dense.len());

    for doc in sparse {
        let score = match unmatched.remove(doc.docid.as_str()) {
            Some(dense_score) => combine_scores(doc.score, dense_score, params.alpha),
            None => min_dense,
        };
        candidates.push(ScoredDoc {
            docid: doc.docid,
            score,
        });
    }

    candidates.extend(
        dense
            .iter()
            .filter(|d| unmatched.contains_key(d.docid.as_str()))
            .map(|d| ScoredDoc::new(d.docid.clone(), min_sparse)),
    );

    sort_fused(&mut candidates);
    candidates.truncate(params.k);

    Ok(RankedList::from_unique(candidates))
}
