// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Ranking order for fused candidates.
//!
//! Fused lists are sorted best-first: score descending. Two candidates with
//! equal scores keep their candidate order (the sort is stable), so sparse
//! candidates come before dense-only candidates at the same score, and each
//! group keeps its retriever's order. NaN scores rank last.

use std::cmp::Ordering;

use crate::types::ScoredDoc;

/// Compare two fused candidates for ranking.
///
/// Returns `Less` when `a` should rank above `b`. Equal scores compare
/// `Equal`; position breaks the tie through the stable sort in
/// [`sort_fused`].
pub fn compare_fused(a: &ScoredDoc, b: &ScoredDoc) -> Ordering {
    match (a.score.is_nan(), b.score.is_nan()) {
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}

/// Sort candidates best-first, keeping candidate order among ties.
pub fn sort_fused(candidates: &mut [ScoredDoc]) {
    candidates.sort_by(compare_fused);
}
