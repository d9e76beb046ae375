//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.

#![doc(hidden)]

use crate::types::RankedList;

/// Build a ranked list from `(docid, score)` pairs, kept in the given order.
///
/// # Panics
///
/// On duplicate docids. Tests that want the error use `RankedList::from_pairs`.
pub fn ranked(pairs: &[(&str, f32)]) -> RankedList {
    RankedList::from_pairs(pairs.iter().copied()).expect("test list has duplicate docids")
}

/// `(docid, score)` pairs of a list, for compact assertions.
pub fn pairs(list: &RankedList) -> Vec<(String, f32)> {
    list.iter().map(|d| (d.docid.clone(), d.score)).collect()
}
