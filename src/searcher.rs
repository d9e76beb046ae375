// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Hybrid search: run both retrievers, then fuse per query.

use std::collections::HashMap;

use tracing::debug;

use crate::batch::{BatchCoordinator, BatchOutcome, CancelFlag, Concurrency, QueryKey};
use crate::error::{ConfigError, Result};
use crate::fusion::FusionParams;
use crate::retrieval::{DenseRetriever, SparseRetriever};
use crate::types::{QueryBatch, RankedList};

/// Owns one sparse and one dense retriever and fuses their results.
///
/// Retrieval errors abort the batch: fusion needs both sides. Per-query
/// fusion failures come back inside the [`BatchOutcome`].
pub struct HybridSearcher<K> {
    sparse: Box<dyn SparseRetriever>,
    dense: Box<dyn DenseRetriever<K>>,
    sparse_threads: usize,
    coordinator: BatchCoordinator,
}

impl<K: QueryKey> HybridSearcher<K> {
    pub fn new(
        sparse: Box<dyn SparseRetriever>,
        dense: Box<dyn DenseRetriever<K>>,
        params: FusionParams,
    ) -> Self {
        Self {
            sparse,
            dense,
            sparse_threads: 1,
            coordinator: BatchCoordinator::new(params),
        }
    }

    /// Thread count passed to the sparse retriever on each batch search.
    pub fn with_sparse_threads(mut self, threads: usize) -> Self {
        self.sparse_threads = threads.max(1);
        self
    }

    /// Scheduling for the fusion step.
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.coordinator = self.coordinator.with_concurrency(concurrency);
        self
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.coordinator = self.coordinator.with_cancel_flag(flag);
        self
    }

    pub fn params(&self) -> FusionParams {
        self.coordinator.params()
    }

    /// Retrieve up to `k` hits per query from each side and fuse them to `k`.
    ///
    /// `query_ids` and `queries` are parallel slices.
    pub fn batch_search(
        &self,
        query_ids: &[K],
        queries: &[String],
        k: usize,
    ) -> Result<BatchOutcome<K>> {
        if query_ids.len() != queries.len() {
            return Err(ConfigError::QueryCountMismatch {
                ids: query_ids.len(),
                queries: queries.len(),
            }
            .into());
        }
        let params = self.coordinator.params().with_k(k)?;

        let sparse_ids: Vec<String> = query_ids.iter().map(ToString::to_string).collect();
        let mut sparse_results =
            self.sparse
                .batch_search(&sparse_ids, queries, k, self.sparse_threads)?;
        let dense_results = self.dense.batch_search(query_ids, queries, k)?;

        debug!(
            queries = query_ids.len(),
            sparse = sparse_results.len(),
            dense = dense_results.len(),
            "retrieval complete"
        );

        // Sparse results are keyed by the string form of the query id.
        let sparse_results: HashMap<K, RankedList> = query_ids
            .iter()
            .filter_map(|qid| {
                sparse_results
                    .remove(&qid.to_string())
                    .map(|list| (qid.clone(), list))
            })
            .collect();

        let outcome = self
            .coordinator
            .clone()
            .with_params(params)
            .fuse_batch(query_ids, sparse_results, dense_results)?;
        Ok(outcome)
    }

    /// Search every query of a batch.
    pub fn search_batch(&self, batch: &QueryBatch<K>, k: usize) -> Result<BatchOutcome<K>> {
        self.batch_search(&batch.ids(), &batch.texts(), k)
    }
}
