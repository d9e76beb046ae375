// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! hybridrank - fuse sparse and dense retrieval runs.
//!
//! Exit codes: 0 when every query fused, 1 when some queries failed or the
//! run hit a runtime error, 2 for configuration errors.

use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hybridrank::cli::display::print_report;
use hybridrank::cli::{parse_invocation, Cli};
use hybridrank::pipeline;
use hybridrank::Error;

const EXIT_PARTIAL: u8 = 1;
const EXIT_CONFIG: u8 = 2;

fn main() -> ExitCode {
    let invocation = match parse_invocation(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(e) => e.exit(),
    };
    init_tracing(&invocation.cli);

    match pipeline::run(&invocation) {
        Ok(summary) => {
            print_report(&summary, invocation.cli.quiet);
            if summary.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_PARTIAL)
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            match e {
                Error::Config(_) => ExitCode::from(EXIT_CONFIG),
                _ => ExitCode::from(EXIT_PARTIAL),
            }
        }
    }
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,hybridrank=info",
        1 => "info,hybridrank=debug",
        2 => "debug,hybridrank=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
