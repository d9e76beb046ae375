// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Retriever contracts.
//!
//! The sparse and dense engines live outside this crate. These two traits are
//! the whole surface fusion needs from them: a batch search that returns one
//! ranked list per query id.
//!
//! Sparse engines key results by the string form of the query id and take a
//! thread count per call. Dense engines key by the typed query id and fix
//! their concurrency at construction.

mod run_file;

use std::collections::HashMap;

use crate::error::RetrievalError;
use crate::types::RankedList;

pub use run_file::RunFileRetriever;

/// Term-matching retriever (BM25 and friends).
pub trait SparseRetriever: Send + Sync {
    /// Up to `k` hits for each query id, keyed by that id.
    ///
    /// Must return an entry for every requested id, possibly empty.
    fn batch_search(
        &self,
        query_ids: &[String],
        queries: &[String],
        k: usize,
        threads: usize,
    ) -> Result<HashMap<String, RankedList>, RetrievalError>;
}

/// Embedding / nearest-neighbor retriever.
pub trait DenseRetriever<K>: Send + Sync {
    /// Up to `k` hits for each query id, keyed by that id.
    fn batch_search(
        &self,
        query_ids: &[K],
        queries: &[String],
        k: usize,
    ) -> Result<HashMap<K, RankedList>, RetrievalError>;
}
