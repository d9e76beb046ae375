// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! End-to-end run: topics + two run files → one fused run file.
//!
//! ```text
//! topics ──▶ QueryBatch ──┐
//! sparse run ─────────────┼──▶ HybridSearcher ──▶ BatchOutcome ──▶ RunWriter
//! dense run ──────────────┘
//! ```
//!
//! Configuration and topics are validated before either run file is opened.
//! The output file is written even when some queries fail to fuse; those
//! queries are reported in the [`RunSummary`].

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use tracing::{info, info_span, warn};

use crate::batch::QueryKey;
use crate::cli::{Invocation, QidType};
use crate::error::{FusionError, Result};
use crate::output::{RunFormat, RunWriter};
use crate::retrieval::RunFileRetriever;
use crate::searcher::HybridSearcher;
use crate::topics::read_topics;

/// What a finished run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Distinct query ids read from the topics.
    pub queries: usize,
    /// Queries written to the output.
    pub fused: usize,
    /// Failed query ids (string form) with their reasons, in query id order.
    pub failures: Vec<(String, FusionError)>,
    pub output: PathBuf,
    pub format: RunFormat,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Execute a parsed invocation.
pub fn run(invocation: &Invocation) -> Result<RunSummary> {
    match invocation.cli.qid_type {
        QidType::String => run_typed::<String>(invocation),
        QidType::Int => run_typed::<u64>(invocation),
    }
}

fn run_typed<K>(invocation: &Invocation) -> Result<RunSummary>
where
    K: QueryKey + FromStr + Display + 'static,
{
    let started = Instant::now();
    let cli = &invocation.cli;
    let settings = cli.run_config()?.resolve()?;
    let _span = info_span!("run", output = %cli.output.display()).entered();

    let topics = read_topics::<K>(&cli.topics, cli.topic_reader, &cli.topic_field)?;
    info!(
        queries = topics.len(),
        reader = %cli.topic_reader,
        field = %cli.topic_field,
        "loaded topics"
    );

    // Both runs are keyed by the parsed query id, matching the topics.
    let sparse = RunFileRetriever::open_as::<K>(&invocation.sparse.run)?;
    let dense =
        RunFileRetriever::open_as::<K>(&invocation.dense.run)?.with_threads(invocation.dense.threads);

    let params = settings.params;
    let searcher: HybridSearcher<K> =
        HybridSearcher::new(Box::new(sparse), Box::new(dense), params)
            .with_sparse_threads(invocation.sparse.threads)
            .with_concurrency(settings.concurrency);

    let outcome = searcher.search_batch(&topics, params.k())?;

    let mut writer = RunWriter::create(&cli.output, settings.format, settings.run_tag)?;
    writer.write_all(&outcome.results)?;
    writer.finish()?;

    let failures: Vec<(String, FusionError)> = outcome
        .failures
        .into_iter()
        .map(|f| (f.qid.to_string(), f.error))
        .collect();
    if !failures.is_empty() {
        warn!(failed = failures.len(), "some queries were not fused");
    }

    let summary = RunSummary {
        queries: topics.len(),
        fused: outcome.results.len(),
        failures,
        output: cli.output.clone(),
        format: settings.format,
        elapsed: started.elapsed(),
    };
    info!(
        fused = summary.fused,
        queries = summary.queries,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "run complete"
    );
    Ok(summary)
}
