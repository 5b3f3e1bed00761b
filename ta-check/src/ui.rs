//! Console display logic for the ta-check CLI.
//!
//! The report goes to stdout; the header, progress counter and diagnostics
//! go to stderr so the report can be piped. Uses only the `console` crate.

use chrono::{DateTime, Local};
use console::{style, Term};
use ta_check_lib::{ReportSet, TaCheckError};

// ── Progress ─────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A `[done/total]` counter redrawn in place on stderr.
///
/// Does nothing when stderr is not a terminal.
pub struct Progress {
    term: Option<Term>,
}

impl Progress {
    pub fn start() -> Self {
        let term = Term::stderr();
        Self {
            term: term.is_term().then_some(term),
        }
    }

    /// Redraw the counter after a probe completes.
    pub fn update(&self, done: usize, total: usize) {
        if let Some(term) = &self.term {
            let frame = SPINNER_FRAMES[done % SPINNER_FRAMES.len()];
            let _ = term.clear_line();
            let _ = term.write_str(&format!(
                "{} {} probing portal",
                style(frame).cyan(),
                style(format!("[{}/{}]", done, total)).dim()
            ));
        }
    }

    /// Clear the counter line before the report is printed.
    pub fn finish(&self) {
        if let Some(term) = &self.term {
            let _ = term.clear_line();
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print what is being searched and when.
pub fn print_header(prefix: &str, now: DateTime<Local>) {
    eprintln!(
        "{}",
        style(format!(
            "Searching for students without a final-project submission in {}XXX",
            prefix
        ))
        .bold()
    );
    eprintln!("Time: {}", now.format("%a, %d %b %Y %H:%M:%S %z"));
}

// ── Report ───────────────────────────────────────────────────────────────────

/// Print `identifier name` lines in identifier order, then the total.
pub fn print_report(report: &ReportSet) {
    for entry in report.entries() {
        println!("{} {}", style(&entry.identifier).cyan(), entry.name);
    }
    println!("{}", style(report.summary_line()).bold());
}

/// Mention not-submitted identifiers that are missing from the roster.
///
/// They are excluded from the report; `verbose` lists them.
pub fn print_unresolved(unresolved: &[String], verbose: bool) {
    if unresolved.is_empty() {
        return;
    }

    eprintln!(
        "{}",
        style(format!(
            "Note: {} not-submitted identifier{} had no roster name and {} not listed",
            unresolved.len(),
            if unresolved.len() == 1 { "" } else { "s" },
            if unresolved.len() == 1 { "is" } else { "are" },
        ))
        .yellow()
    );

    if verbose {
        for id in unresolved {
            eprintln!("  {}", id);
        }
    } else {
        eprintln!("{}", style("  (use --verbose to list them)").dim());
    }
}

/// List the probes that failed under --keep-going.
pub fn print_failures(failures: &[TaCheckError]) {
    eprintln!(
        "{}",
        style(format!(
            "{} identifier{} could not be checked:",
            failures.len(),
            if failures.len() == 1 { "" } else { "s" }
        ))
        .red()
        .bold()
    );
    for failure in failures {
        eprintln!("  • {}", failure);
    }
}
