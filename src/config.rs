// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Run configuration: command-line flags layered over an optional JSON file.
//!
//! Resolution order for each setting: explicit flag, then config file, then
//! the built-in default. Validation happens once, in [`RunConfig::resolve`].
//!
//! ```json
//! { "alpha": 1.1, "hits": 1000, "threads": 8, "format": "trec", "runtag": "hybrid" }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::batch::Concurrency;
use crate::error::ConfigError;
use crate::fusion::{FusionParams, DEFAULT_ALPHA, DEFAULT_HITS};
use crate::output::{RunFormat, DEFAULT_RUN_TAG};

/// Partially specified settings. Every field is optional so layers can merge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub alpha: Option<f64>,
    pub hits: Option<usize>,
    pub threads: Option<usize>,
    pub format: Option<RunFormat>,
    pub runtag: Option<String>,
}

/// Fully resolved, validated settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub params: FusionParams,
    pub concurrency: Concurrency,
    pub format: RunFormat,
    pub run_tag: String,
}

impl RunConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fill unset fields from `fallback`. Fields set on `self` win.
    pub fn or(self, fallback: RunConfig) -> RunConfig {
        RunConfig {
            alpha: self.alpha.or(fallback.alpha),
            hits: self.hits.or(fallback.hits),
            threads: self.threads.or(fallback.threads),
            format: self.format.or(fallback.format),
            runtag: self.runtag.or(fallback.runtag),
        }
    }

    /// Apply defaults and validate.
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let params = FusionParams::new(
            self.alpha.unwrap_or(DEFAULT_ALPHA),
            self.hits.unwrap_or(DEFAULT_HITS),
        )?;
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(Settings {
            params,
            concurrency: Concurrency::from_threads(self.threads),
            format: self.format.unwrap_or_default(),
            run_tag: self.runtag.unwrap_or_else(|| DEFAULT_RUN_TAG.to_string()),
        })
    }
}
