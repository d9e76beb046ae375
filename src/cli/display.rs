// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal output for the end-of-run summary.
//!
//! The summary goes to stderr so stdout stays free for piping. Colors follow
//! the terminal theme: OneDark for dark terminals, One Light for light ones.
//!
//! # Theme detection order
//!
//! 1. `HYBRIDRANK_THEME` env var ("dark" or "light")
//! 2. `COLORFGBG` env var (terminal background hint)
//! 3. Default to dark theme
//!
//! `NO_COLOR` and non-TTY stderr disable colors entirely.

use std::fmt::Write as _;
use std::sync::OnceLock;
use std::time::Duration;

use crate::pipeline::RunSummary;

/// Terminal color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

static THEME: OnceLock<Theme> = OnceLock::new();

fn detect_theme() -> Theme {
    if let Ok(theme) = std::env::var("HYBRIDRANK_THEME") {
        match theme.to_lowercase().as_str() {
            "light" | "l" => return Theme::Light,
            "dark" | "d" => return Theme::Dark,
            _ => {}
        }
    }

    // "fg;bg": background 7 and up is light, except 8 (dark gray)
    if let Ok(colorfgbg) = std::env::var("COLORFGBG") {
        if let Some(Ok(bg)) = colorfgbg.split(';').next_back().map(str::parse::<u8>) {
            if bg >= 7 && bg != 8 {
                return Theme::Light;
            }
        }
    }

    Theme::Dark
}

/// Current theme (cached)
pub fn theme() -> Theme {
    *THEME.get_or_init(detect_theme)
}

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

fn rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

/// Summary palette entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Ok,
    Failed,
    Muted,
    Accent,
}

impl Tone {
    fn escape(self, theme: Theme) -> String {
        // OneDark / One Light
        let rgb_value = match (theme, self) {
            (Theme::Dark, Tone::Ok) => (152, 195, 121),
            (Theme::Dark, Tone::Failed) => (224, 108, 117),
            (Theme::Dark, Tone::Muted) => (92, 99, 112),
            (Theme::Dark, Tone::Accent) => (86, 182, 194),
            (Theme::Light, Tone::Ok) => (80, 161, 79),
            (Theme::Light, Tone::Failed) => (228, 86, 73),
            (Theme::Light, Tone::Muted) => (160, 161, 167),
            (Theme::Light, Tone::Accent) => (1, 132, 188),
        };
        rgb(rgb_value)
    }
}

/// Check if colors should be used on stderr.
pub fn use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    atty::is(atty::Stream::Stderr)
}

/// Styled text, or plain text when `colors` is off.
pub fn paint(tone: Tone, bold: bool, text: &str, colors: bool) -> String {
    if !colors {
        return text.to_string();
    }
    let weight = if bold { BOLD } else { "" };
    format!("{}{}{}{}", weight, tone.escape(theme()), text, RESET)
}

fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_secs_f64() * 1000.0;
    if ms < 1000.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

/// Render the summary block.
///
/// One status line, then one line per failed query id.
pub fn render_summary(summary: &RunSummary, colors: bool) -> String {
    let mut out = String::new();
    let (mark, tone) = if summary.is_complete() {
        ("✓", Tone::Ok)
    } else {
        ("✗", Tone::Failed)
    };

    let _ = writeln!(
        out,
        "{} fused {}/{} queries → {} {}",
        paint(tone, true, mark, colors),
        summary.fused,
        summary.queries,
        paint(Tone::Accent, false, &summary.output.display().to_string(), colors),
        paint(
            Tone::Muted,
            false,
            &format!("({}, {})", summary.format, format_elapsed(summary.elapsed)),
            colors
        ),
    );
    out.push_str(&render_failures(summary, colors));
    out
}

/// One `  · qid: reason` line per failed query id. Empty when all fused.
pub fn render_failures(summary: &RunSummary, colors: bool) -> String {
    let mut out = String::new();
    for (qid, error) in &summary.failures {
        let _ = writeln!(
            out,
            "  {} {}: {}",
            paint(Tone::Failed, false, "·", colors),
            qid,
            error
        );
    }
    out
}

/// What goes to stderr after a run. `quiet` drops the status line; failed
/// query ids are always listed.
pub fn render_report(summary: &RunSummary, quiet: bool, colors: bool) -> String {
    if quiet {
        render_failures(summary, colors)
    } else {
        render_summary(summary, colors)
    }
}

/// Print the end-of-run report to stderr.
pub fn print_report(summary: &RunSummary, quiet: bool) {
    eprint!("{}", render_report(summary, quiet, use_colors()));
}
