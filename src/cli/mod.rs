// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the hybridrank command-line interface.
//!
//! The argument list carries three blocks. Everything after the marker token
//! `sparse` configures the sparse retriever, everything after `dense`
//! configures the dense retriever, and the rest is the main block:
//!
//! ```text
//! hybridrank --topics topics.jsonl --output fused.trec --alpha 1.1 \
//!     sparse --run bm25.trec --threads 4 \
//!     dense --run ann.trec --threads 8
//! ```
//!
//! Markers can come in either order, and a marker may appear more than once
//! (arguments accumulate into its block). Each block is parsed by its own
//! clap parser.

pub mod display;

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};

use crate::config::RunConfig;
use crate::error::ConfigError;
use crate::output::RunFormat;
use crate::topics::{TopicReader, DEFAULT_TOPIC_FIELD};

/// Token that opens the sparse retriever block.
pub const SPARSE_MARKER: &str = "sparse";

/// Token that opens the dense retriever block.
pub const DENSE_MARKER: &str = "dense";

#[derive(Parser, Debug)]
#[command(
    name = "hybridrank",
    about = "Fuse sparse and dense retrieval runs into one ranking",
    version,
    after_help = "Retriever blocks follow the marker tokens `sparse` and `dense`:\n  \
        hybridrank --topics t.jsonl --output fused.trec sparse --run bm25.trec dense --run ann.trec"
)]
pub struct Cli {
    /// Topic files; later files win for repeated query ids
    #[arg(long, required = true, num_args = 1..)]
    pub topics: Vec<PathBuf>,

    /// Topic file format (tsv or jsonl)
    #[arg(long, default_value = "jsonl")]
    pub topic_reader: TopicReader,

    /// Topic field used as the query text (jsonl only)
    #[arg(long, default_value = DEFAULT_TOPIC_FIELD)]
    pub topic_field: String,

    /// Output run file
    #[arg(long)]
    pub output: PathBuf,

    /// Output format (trec or msmarco) [default: trec]
    #[arg(long)]
    pub format: Option<RunFormat>,

    /// Run tag written in TREC output [default: hybridrank]
    #[arg(long)]
    pub runtag: Option<String>,

    /// Weight of the sparse score in the fusion formula [default: 1.1]
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Number of hits to retrieve and keep per query [default: 1000]
    #[arg(long)]
    pub hits: Option<usize>,

    /// Fusion worker threads [default: one per CPU]
    #[arg(long)]
    pub threads: Option<usize>,

    /// How query ids are ordered and matched
    #[arg(long, value_enum, default_value_t = QidType::String)]
    pub qid_type: QidType,

    /// JSON file with defaults for alpha, hits, threads, format and runtag
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence logging and the status line (failed queries are still listed)
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Query id type chosen on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum QidType {
    /// Lexicographic string ids
    String,
    /// Unsigned integer ids, ordered numerically
    Int,
}

/// Arguments after the `sparse` marker.
#[derive(Parser, Debug)]
#[command(name = "sparse")]
pub struct SparseArgs {
    /// Run file produced by the sparse retriever
    #[arg(long)]
    pub run: PathBuf,

    /// Threads used for each batch search
    #[arg(long, default_value_t = 1, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub threads: usize,
}

/// Arguments after the `dense` marker.
#[derive(Parser, Debug)]
#[command(name = "dense")]
pub struct DenseArgs {
    /// Run file produced by the dense retriever
    #[arg(long)]
    pub run: PathBuf,

    /// Threads used by the dense retriever
    #[arg(long, default_value_t = 1, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub threads: usize,
}

/// Raw argument blocks after marker splitting.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SplitArgs {
    pub main: Vec<String>,
    pub sparse: Vec<String>,
    pub dense: Vec<String>,
}

/// Split arguments (without the program name) on the marker tokens.
pub fn split_args<I, T>(args: I) -> SplitArgs
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    #[derive(Clone, Copy)]
    enum Block {
        Main,
        Sparse,
        Dense,
    }

    let mut split = SplitArgs::default();
    let mut block = Block::Main;
    for arg in args {
        let arg = arg.into();
        match arg.as_str() {
            SPARSE_MARKER => block = Block::Sparse,
            DENSE_MARKER => block = Block::Dense,
            _ => match block {
                Block::Main => split.main.push(arg),
                Block::Sparse => split.sparse.push(arg),
                Block::Dense => split.dense.push(arg),
            },
        }
    }
    split
}

/// All three blocks, parsed.
#[derive(Debug)]
pub struct Invocation {
    pub cli: Cli,
    pub sparse: SparseArgs,
    pub dense: DenseArgs,
}

/// Split and parse a full argument list (without the program name).
///
/// The main block is parsed first so `--help` and `--version` work without
/// retriever blocks.
pub fn parse_invocation<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let split = split_args(args);
    let cli = Cli::try_parse_from(with_name("hybridrank", split.main))?;
    let sparse = SparseArgs::try_parse_from(with_name(SPARSE_MARKER, split.sparse))?;
    let dense = DenseArgs::try_parse_from(with_name(DENSE_MARKER, split.dense))?;
    Ok(Invocation { cli, sparse, dense })
}

fn with_name(name: &str, args: Vec<String>) -> Vec<String> {
    std::iter::once(name.to_string()).chain(args).collect()
}

impl Cli {
    /// Flag values as a config layer.
    pub fn flags(&self) -> RunConfig {
        RunConfig {
            alpha: self.alpha,
            hits: self.hits,
            threads: self.threads,
            format: self.format,
            runtag: self.runtag.clone(),
        }
    }

    /// Flags layered over the config file, if one was given.
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let flags = self.flags();
        match &self.config {
            Some(path) => Ok(flags.or(RunConfig::load(path)?)),
            None => Ok(flags),
        }
    }
}
