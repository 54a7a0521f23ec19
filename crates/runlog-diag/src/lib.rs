#![warn(missing_docs)]
//! Log-to-diagnostics pipeline for analytical-language execution.
//!
//! # Overview
//!
//! An execution engine's log re-numbers and re-wraps submitted source
//! independently of the editor, spreads one diagnosis across several physical
//! lines (message header, continuations, `-`/`_` column indicators, stacked
//! problem-number rows), and the code it ran was a wrapped assembly of the
//! user's selections rather than the raw document. This crate recovers
//! precise document ranges from that text in two stages:
//!
//! 1. [`extract_problems`], the log classifier & problem extractor. Consumes
//!    classified [`LogLine`]s plus the first submitted code line (the marker
//!    that anchors the relevant execution) and produces [`Problem`]s with
//!    log-relative coordinates.
//! 2. [`OffsetReconciler`], the raw-code offset reconciler. Built from the
//!    same submission parameters (document, selections, wrapper), it rewrites
//!    problem coordinates back into the raw document, clamping anything that
//!    falls outside the submitted ranges.
//!
//! [`document_problems`] runs both stages.
//!
//! Both stages are synchronous pure functions over fully materialized input.
//! Malformed log text is skipped rather than reported: the only failure shape
//! is an empty result, which is indistinguishable from a clean run.
//!
//! # Example
//!
//! ```rust
//! use runlog_diag::{LogLine, LogLineKind, document_problems};
//! use runlog_submit::SubmitParams;
//!
//! let log = [
//!     LogLine::new(LogLineKind::Source, "   1  data x; sett y;"),
//!     LogLine::new(LogLineKind::Error, "ERROR: Unknown statement."),
//! ];
//! let problems = document_problems(
//!     &log,
//!     "data x; sett y;",
//!     "data x; sett y;",
//!     &[],
//!     &SubmitParams::default(),
//! );
//! assert_eq!(problems.len(), 1);
//! assert_eq!(problems[0].line, 0);
//! ```

pub mod extract;
pub mod log;
pub mod problem;
pub mod reconcile;

pub use extract::extract_problems;
pub use log::{LogLine, LogLineKind, SourceEcho, parse_source_echo};
pub use problem::{Problem, ProblemKind};
pub use reconcile::{LocationOffset, OffsetReconciler};

use runlog_submit::{CodeWrapper, SelectionRange};

/// Run the full pipeline: extract problems from one completed execution's log
/// and map them back into the raw document.
///
/// `first_submitted_line` must be the first line of the wrapped program that
/// was submitted; `document`, `selections`, and `wrapper` must match what was
/// used at submission time, so the wrapping can be re-run deterministically.
pub fn document_problems(
    log_lines: &[LogLine],
    first_submitted_line: &str,
    document: &str,
    selections: &[SelectionRange],
    wrapper: &dyn CodeWrapper,
) -> Vec<Problem> {
    let mut problems = extract_problems(log_lines, first_submitted_line);
    let reconciler = OffsetReconciler::new(document, selections, wrapper);
    reconciler.apply(&mut problems);
    problems
}
