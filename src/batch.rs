// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Batch fusion: run the per-query fusion over every query id.
//!
//! Each query's fusion reads only that query's two lists, so queries are
//! embarrassingly parallel. Rayon makes this trivial: `into_par_iter()` over
//! the prepared jobs inside a pool sized to the configured thread count.
//!
//! Determinism does not depend on completion order. Jobs are prepared in
//! query id order, results are collected positionally, and the final map is a
//! `BTreeMap` keyed by query id.
//!
//! Failures stay local. A query with a missing or empty list is recorded in
//! [`BatchOutcome::failures`] and its siblings are fused as usual.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{BatchError, FusionError};
use crate::fusion::{fuse, FusionParams};
use crate::types::{FusionResult, RankedList, Side};

/// Bounds every query id type must satisfy.
pub trait QueryKey: Ord + Clone + Hash + Display + Send + Sync {}

impl<T> QueryKey for T where T: Ord + Clone + Hash + Display + Send + Sync {}

/// How per-query fusions are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// One query after another on the calling thread.
    #[default]
    Sequential,
    /// A dedicated worker pool with this many threads.
    Pool { threads: usize },
}

impl Concurrency {
    /// `None` means "let rayon decide" (one worker per available CPU).
    pub fn from_threads(threads: Option<usize>) -> Self {
        match threads {
            Some(1) => Concurrency::Sequential,
            Some(threads) => Concurrency::Pool { threads },
            None => Concurrency::Pool {
                threads: default_threads(),
            },
        }
    }
}

#[cfg(feature = "parallel")]
fn default_threads() -> usize {
    rayon::current_num_threads()
}

#[cfg(not(feature = "parallel"))]
fn default_threads() -> usize {
    1
}

/// Shared stop signal for a running batch.
///
/// Raising it stops new per-query fusions from starting. Fusions already
/// finished are kept; the rest are reported as [`FusionError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One query that could not be fused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFailure<K> {
    pub qid: K,
    pub error: FusionError,
}

/// Everything a batch produced: fused lists plus per-query failures.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<K: Ord> {
    /// Fused lists for the queries that succeeded, in query id order.
    pub results: FusionResult<K>,
    /// Queries that failed, in query id order.
    pub failures: Vec<QueryFailure<K>>,
}

impl<K: Ord> BatchOutcome<K> {
    /// True when every query fused.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_ids(&self) -> impl Iterator<Item = &K> {
        self.failures.iter().map(|f| &f.qid)
    }
}

/// A query id with whatever lists were found for it.
struct Job<K> {
    qid: K,
    sparse: Option<RankedList>,
    dense: Option<RankedList>,
}

/// Drives [`fuse`] across a batch of query ids.
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    params: FusionParams,
    concurrency: Concurrency,
    cancel: Option<CancelFlag>,
}

impl BatchCoordinator {
    /// Sequential coordinator with the given fusion parameters.
    pub fn new(params: FusionParams) -> Self {
        Self {
            params,
            concurrency: Concurrency::Sequential,
            cancel: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Same scheduling, different fusion parameters.
    pub fn with_params(mut self, params: FusionParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> FusionParams {
        self.params
    }

    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    /// Fuse every query in `query_ids`.
    ///
    /// Lists are moved out of the two maps. Entries for ids not in
    /// `query_ids` are ignored; repeated ids are fused once.
    ///
    /// # Errors
    ///
    /// Only batch setup can fail (building the worker pool). Per-query
    /// failures are returned inside the [`BatchOutcome`].
    pub fn fuse_batch<K: QueryKey>(
        &self,
        query_ids: &[K],
        mut sparse: HashMap<K, RankedList>,
        mut dense: HashMap<K, RankedList>,
    ) -> Result<BatchOutcome<K>, BatchError> {
        let ordered: BTreeSet<&K> = query_ids.iter().collect();
        let jobs: Vec<Job<K>> = ordered
            .into_iter()
            .map(|qid| Job {
                qid: qid.clone(),
                sparse: sparse.remove(qid),
                dense: dense.remove(qid),
            })
            .collect();

        debug!(
            queries = jobs.len(),
            alpha = self.params.alpha(),
            k = self.params.k(),
            concurrency = ?self.concurrency,
            "fusing batch"
        );

        let fused = match self.concurrency {
            Concurrency::Sequential => self.run_sequential(jobs),
            Concurrency::Pool { threads } => self.run_pool(jobs, threads)?,
        };

        let mut outcome = BatchOutcome {
            results: FusionResult::new(),
            failures: Vec::new(),
        };
        for (qid, result) in fused {
            match result {
                Ok(list) => {
                    outcome.results.insert(qid, list);
                }
                Err(error) => {
                    warn!(qid = %qid, %error, "query fusion failed");
                    outcome.failures.push(QueryFailure { qid, error });
                }
            }
        }

        info!(
            fused = outcome.results.len(),
            failed = outcome.failures.len(),
            "fusion batch complete"
        );
        Ok(outcome)
    }

    fn run_sequential<K>(&self, jobs: Vec<Job<K>>) -> Vec<(K, Result<RankedList, FusionError>)> {
        jobs.into_iter().map(|job| self.run_job(job)).collect()
    }

    #[cfg(feature = "parallel")]
    fn run_pool<K: QueryKey>(
        &self,
        jobs: Vec<Job<K>>,
        threads: usize,
    ) -> Result<Vec<(K, Result<RankedList, FusionError>)>, BatchError> {
        if threads == 0 {
            return Err(BatchError::ZeroThreads);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hybridrank-fuse-{i}"))
            .build()?;
        Ok(pool.install(|| jobs.into_par_iter().map(|job| self.run_job(job)).collect()))
    }

    #[cfg(not(feature = "parallel"))]
    fn run_pool<K: QueryKey>(
        &self,
        jobs: Vec<Job<K>>,
        threads: usize,
    ) -> Result<Vec<(K, Result<RankedList, FusionError>)>, BatchError> {
        if threads == 0 {
            return Err(BatchError::ZeroThreads);
        }
        debug!(threads, "built without `parallel`; fusing sequentially");
        Ok(self.run_sequential(jobs))
    }

    fn run_job<K>(&self, job: Job<K>) -> (K, Result<RankedList, FusionError>) {
        let Job { qid, sparse, dense } = job;
        if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            return (qid, Err(FusionError::Cancelled));
        }
        let result = match (sparse, dense) {
            (None, _) => Err(FusionError::MissingRetrievalResult { side: Side::Sparse }),
            (_, None) => Err(FusionError::MissingRetrievalResult { side: Side::Dense }),
            (Some(sparse), Some(dense)) => fuse(sparse, dense, self.params),
        };
        (qid, result)
    }
}
