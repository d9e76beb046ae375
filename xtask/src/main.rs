//! Custom cargo commands for the hybridrank crate.
//!
//! Usage:
//!   cargo xtask verify    - Run full verification suite
//!   cargo xtask test      - Run all tests (with and without `parallel`)
//!   cargo xtask check     - Quick check
//!   cargo xtask bench     - Run benchmarks

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::process::Command;

fn main() -> Result<()> {
    let task = env::args().nth(1);
    match task.as_deref() {
        Some("verify") => verify()?,
        Some("test") => test()?,
        Some("check") => check()?,
        Some("bench") => bench()?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        r#"
cargo xtask <COMMAND>

Commands:
  verify    Run full verification suite (tests + clippy + fmt + defaults)
  test      Run all Rust tests, with and without the parallel feature
  check     Quick check (cargo check + clippy)
  bench     Run benchmarks
"#
    );
}

/// Full verification suite
fn verify() -> Result<()> {
    println!("==========================================");
    println!("hybridrank Verification Suite");
    println!("==========================================\n");

    println!("[1/4] Running Rust tests...");
    test()?;
    println!("✓ All Rust tests passed\n");

    println!("[2/4] Running clippy...");
    run_cargo(&["clippy", "--quiet", "--all-targets", "--", "-D", "warnings"])?;
    println!("✓ Clippy passed\n");

    println!("[3/4] Checking formatting...");
    run_cargo(&["fmt", "--all", "--check"])?;
    println!("✓ Formatting clean\n");

    println!("[4/4] Verifying documented defaults...");
    verify_defaults()?;
    println!("✓ CLI help matches library defaults\n");

    println!("==========================================");
    println!("✓ ALL VERIFICATION CHECKS PASSED");
    println!("==========================================");

    Ok(())
}

/// Run all tests
fn test() -> Result<()> {
    run_cargo(&["test", "--quiet"])?;
    run_cargo(&["test", "--quiet", "--no-default-features"])
}

/// Quick check
fn check() -> Result<()> {
    println!("Running quick checks...\n");

    println!("[1/2] cargo check...");
    run_cargo(&["check", "--all-targets"])?;

    println!("[2/2] cargo clippy...");
    run_cargo(&["clippy", "--quiet", "--", "-D", "warnings"])?;

    println!("\n✓ Quick checks passed");
    Ok(())
}

/// Run benchmarks
fn bench() -> Result<()> {
    run_cargo(&["bench"])
}

// ============================================================================
// Helper functions
// ============================================================================

fn project_root() -> Result<PathBuf> {
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => env::current_dir().context("Failed to read current directory")?,
    };

    // xtask is in project_root/xtask, so go up one level
    let root = manifest_dir.parent().unwrap_or(&manifest_dir);
    Ok(root.to_path_buf())
}

fn run_cargo(args: &[&str]) -> Result<()> {
    let root = project_root()?;

    let status = Command::new("cargo")
        .args(args)
        .current_dir(&root)
        .status()
        .with_context(|| format!("Failed to run cargo {:?}", args))?;

    if !status.success() {
        bail!("cargo {:?} failed", args);
    }

    Ok(())
}

/// The `[default: ...]` notes in the CLI help are hand-written; keep them in
/// step with the constants they describe.
fn verify_defaults() -> Result<()> {
    let root = project_root()?;

    let fusion_rs = std::fs::read_to_string(root.join("src/fusion/mod.rs"))
        .context("Failed to read src/fusion/mod.rs")?;
    let output_rs = std::fs::read_to_string(root.join("src/output.rs"))
        .context("Failed to read src/output.rs")?;
    let cli_rs = std::fs::read_to_string(root.join("src/cli/mod.rs"))
        .context("Failed to read src/cli/mod.rs")?;

    let pairs = [
        ("DEFAULT_ALPHA", &fusion_rs, "alpha"),
        ("DEFAULT_HITS", &fusion_rs, "hits"),
        ("DEFAULT_RUN_TAG", &output_rs, "runtag"),
    ];

    for (constant, source, flag) in pairs {
        let value = extract_const(source, constant)
            .with_context(|| format!("{} not found", constant))?;
        let documented = extract_help_default(&cli_rs, flag)
            .with_context(|| format!("no [default: ...] note on --{}", flag))?;
        if value != documented {
            bail!(
                "{} = {} but --{} help says [default: {}]",
                constant, value, flag, documented
            );
        }
    }

    Ok(())
}

fn extract_const(content: &str, name: &str) -> Option<String> {
    // Look for "pub const NAME: T = value;"
    let line = content
        .lines()
        .find(|l| l.contains(&format!("const {}:", name)))?;
    let value = line.split('=').nth(1)?.trim().trim_end_matches(';').trim();
    Some(value.trim_matches('"').to_string())
}

fn extract_help_default(content: &str, field: &str) -> Option<String> {
    // The doc comment sits a line or two above "pub field:"
    let lines: Vec<&str> = content.lines().collect();
    let idx = lines
        .iter()
        .position(|l| l.trim_start().starts_with(&format!("pub {}:", field)))?;
    lines[idx.saturating_sub(3)..idx]
        .iter()
        .find_map(|l| l.split("[default: ").nth(1))
        .and_then(|rest| rest.split(']').next())
        .map(str::to_string)
}
