// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for fusion invariants.
//!
//! Arbitrary scores include NaN, infinities and negative zero. Fusion must not
//! panic on any of them, must keep docids unique, and must never return more
//! than `k` hits or more hits than there are candidates.

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use hybridrank::{fuse, FusionParams, RankedList};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    sparse: Vec<(u8, f32)>,
    dense: Vec<(u8, f32)>,
    alpha: u8,
    k: u8,
}

/// Docids come from a byte so the two lists collide often.
fn list(hits: &[(u8, f32)]) -> RankedList {
    let mut seen = HashSet::new();
    let unique = hits
        .iter()
        .filter(|(id, _)| seen.insert(*id))
        .map(|(id, score)| (format!("d{}", id), *score));
    RankedList::from_pairs(unique).expect("deduplicated above")
}

fuzz_target!(|input: Input| {
    let sparse = list(&input.sparse);
    let dense = list(&input.dense);
    let k = usize::from(input.k).max(1);
    let params = FusionParams::new(f64::from(input.alpha) / 16.0, k).expect("valid params");

    let union: HashSet<&str> = sparse.docids().chain(dense.docids()).collect();
    let candidates = union.len();

    let fused = match fuse(sparse.clone(), dense.clone(), params) {
        Ok(fused) => fused,
        Err(_) => {
            // INVARIANT: only an empty side is rejected
            assert!(sparse.is_empty() || dense.is_empty());
            return;
        }
    };

    // INVARIANT: length is min(k, |union|)
    assert_eq!(fused.len(), k.min(candidates));

    // INVARIANT: docids stay unique
    let ids: HashSet<&str> = fused.docids().collect();
    assert_eq!(ids.len(), fused.len());

    // INVARIANT: NaN never ranks above a number
    let first_nan = fused.iter().position(|d| d.score.is_nan());
    if let Some(pos) = first_nan {
        assert!(fused.iter().skip(pos).all(|d| d.score.is_nan()));
    }

    // INVARIANT: deterministic
    let again = fuse(sparse, dense, params).expect("succeeded once");
    assert_eq!(fused.len(), again.len());
    for (a, b) in fused.iter().zip(again.iter()) {
        assert_eq!(a.docid, b.docid);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
    }
});
