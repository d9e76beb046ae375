// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Run file output.
//!
//! ```text
//! trec:     qid Q0 docid rank score tag
//! msmarco:  qid<TAB>docid<TAB>rank
//! ```
//!
//! Ranks start at 1. Writing never touches the in-memory results, so a failed
//! write can be retried against another path.

use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ConfigError, OutputError};
use crate::types::{FusionResult, RankedList};

/// Run tag written in TREC output when none is configured.
pub const DEFAULT_RUN_TAG: &str = "hybridrank";

/// Output format for fused runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunFormat {
    #[default]
    Trec,
    Msmarco,
}

impl FromStr for RunFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trec" => Ok(RunFormat::Trec),
            "msmarco" => Ok(RunFormat::Msmarco),
            _ => Err(ConfigError::UnknownRunFormat(s.to_string())),
        }
    }
}

impl fmt::Display for RunFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFormat::Trec => f.write_str("trec"),
            RunFormat::Msmarco => f.write_str("msmarco"),
        }
    }
}

/// Buffered writer for fused runs.
pub struct RunWriter<W: Write> {
    out: W,
    format: RunFormat,
    run_tag: String,
    target: String,
}

impl RunWriter<BufWriter<File>> {
    /// Create (or truncate) the run file at `path`.
    pub fn create(
        path: impl AsRef<Path>,
        format: RunFormat,
        run_tag: impl Into<String>,
    ) -> Result<Self, OutputError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| OutputError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            out: BufWriter::new(file),
            format,
            run_tag: run_tag.into(),
            target: path.display().to_string(),
        })
    }
}

impl<W: Write> RunWriter<W> {
    /// Write to any sink. `target` names it in error messages.
    pub fn new(out: W, format: RunFormat, run_tag: impl Into<String>, target: &str) -> Self {
        Self {
            out,
            format,
            run_tag: run_tag.into(),
            target: target.to_string(),
        }
    }

    /// Write one query's hits in list order.
    pub fn write_topic<K: Display>(&mut self, qid: &K, hits: &RankedList) -> Result<(), OutputError> {
        for (rank, hit) in hits.iter().enumerate() {
            let rank = rank + 1;
            let written = match self.format {
                RunFormat::Trec => writeln!(
                    self.out,
                    "{} Q0 {} {} {:.6} {}",
                    qid, hit.docid, rank, hit.score, self.run_tag
                ),
                RunFormat::Msmarco => writeln!(self.out, "{}\t{}\t{}", qid, hit.docid, rank),
            };
            written.map_err(|source| self.write_error(source))?;
        }
        Ok(())
    }

    /// Write every query in `results`, in query id order.
    pub fn write_all<K: Ord + Display>(
        &mut self,
        results: &FusionResult<K>,
    ) -> Result<(), OutputError> {
        for (qid, hits) in results {
            self.write_topic(qid, hits)?;
        }
        Ok(())
    }

    /// Flush and hand back the underlying sink.
    pub fn finish(mut self) -> Result<W, OutputError> {
        self.out.flush().map_err(|source| self.write_error(source))?;
        Ok(self.out)
    }

    fn write_error(&self, source: std::io::Error) -> OutputError {
        OutputError::Write {
            target: self.target.clone(),
            source,
        }
    }
}
