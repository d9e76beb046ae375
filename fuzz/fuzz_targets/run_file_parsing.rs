// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for run file parsing.
//!
//! Any input either parses or returns an error. Parsed runs answer `top_k`
//! with unique docids and at most `k` hits.

#![no_main]

use std::collections::HashSet;

use hybridrank::RunFileRetriever;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let Ok(run) = RunFileRetriever::parse(&text, "fuzz.run") else {
        return;
    };

    for line in text.lines() {
        let Some(qid) = line.split_whitespace().next() else {
            continue;
        };
        let top = run.top_k(qid, 5);
        assert!(top.len() <= 5);
        let ids: HashSet<&str> = top.docids().collect();
        assert_eq!(ids.len(), top.len());
    }
});
