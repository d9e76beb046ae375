//! Hybrid retrieval by rank fusion: one sparse list + one dense list → one
//! top-k list per query.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  topics.rs  │────▶│ searcher.rs  │────▶│  output.rs   │
//! │ (QueryBatch)│     │(HybridSearch)│     │ (RunWriter)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//!                       │          │
//!                       ▼          ▼
//!              ┌──────────────┐  ┌──────────────┐
//!              │ retrieval/   │  │  batch.rs    │
//!              │ (Sparse/Dense│  │ (Coordinator)│
//!              │  retrievers) │  └──────────────┘
//!              └──────────────┘         │
//!                                       ▼
//!                              ┌──────────────────┐
//!                              │    fusion/       │
//!                              │ (fuse, ranking)  │
//!                              └──────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module      | Role                                               |
//! |-------------|----------------------------------------------------|
//! | `types`     | `ScoredDoc`, `RankedList`, `QueryBatch`            |
//! | `fusion`    | Per-query fusion rule and output ordering          |
//! | `batch`     | Fusing many queries, sequentially or on a pool     |
//! | `retrieval` | Retriever traits and the run-file retriever        |
//! | `searcher`  | Retrieve from both sides, then fuse                |
//! | `topics`    | TSV / JSONL topic readers                          |
//! | `output`    | TREC / MS MARCO run writer                         |
//! | `config`    | Flag + JSON file layering                          |
//! | `pipeline`  | The full command-line run                          |
//!
//! # Example
//!
//! ```
//! use hybridrank::{BatchCoordinator, FusionParams, RankedList};
//! use std::collections::HashMap;
//!
//! let sparse = HashMap::from([(1u32, RankedList::from_pairs([("d1", 10.0), ("d2", 5.0)]).unwrap())]);
//! let dense = HashMap::from([(1u32, RankedList::from_pairs([("d1", 8.0), ("d3", 6.0)]).unwrap())]);
//!
//! let coordinator = BatchCoordinator::new(FusionParams::new(1.0, 10).unwrap());
//! let outcome = coordinator.fuse_batch(&[1], sparse, dense).unwrap();
//!
//! assert!(outcome.is_complete());
//! assert_eq!(outcome.results[&1].len(), 3);
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod fusion;
pub mod output;
pub mod pipeline;
pub mod retrieval;
pub mod searcher;
pub mod testing;
pub mod topics;
pub mod types;

// Re-exports for public API
pub use batch::{BatchCoordinator, BatchOutcome, CancelFlag, Concurrency, QueryFailure, QueryKey};
pub use config::{RunConfig, Settings};
pub use error::{
    BatchError, ConfigError, DuplicateDocid, Error, FusionError, OutputError, Result,
    RetrievalError,
};
pub use fusion::{combine_scores, fuse, FusionParams, DEFAULT_ALPHA, DEFAULT_HITS};
pub use output::{RunFormat, RunWriter};
pub use retrieval::{DenseRetriever, RunFileRetriever, SparseRetriever};
pub use searcher::HybridSearcher;
pub use topics::{read_topics, TopicReader};
pub use types::{FusionResult, QueryBatch, RankedList, ScoredDoc, Side};
