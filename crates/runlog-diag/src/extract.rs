//! Log classifier & problem extractor.
//!
//! The engine's log interleaves echoed source, multi-line error/warning text,
//! and annotation lines that mark columns with runs of `-`/`_` and correlate
//! them to message text through opaque problem-number tokens:
//!
//! ```text
//!    65  call symputx('a' b);
//!        -------          -
//!        22               79
//! ERROR 22-322: Syntax error, expecting one of the following: ...
//! ERROR 79-185: The argument is not recognized.
//! ```
//!
//! This module scans one completed execution's classified log lines and emits
//! [`Problem`]s with log-relative coordinates. Messages, indicators, and
//! number rows are physically separated across lines, so the scan accumulates
//! per-statement state and resolves a whole batch whenever a genuinely new
//! source line appears (and once more at end of input).
//!
//! Malformed annotation text is never an error: anything that cannot be
//! resolved is skipped or falls back to the general location (the full
//! trimmed extent of the echoed statement).

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::log::{
    LogLine, LogLineKind, char_column_of, is_line_number_stub, is_wrapped_continuation,
    parse_source_echo,
};
use crate::problem::{Problem, ProblemKind};

static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(error|warning)(\s*(\d+)-\d+)?:\s").expect("header pattern"));
static INDICATOR_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-_][-_\s]*$").expect("indicator pattern"));
static NUMBER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d[\d\s]*$").expect("number line pattern"));
static LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("label pattern"));

/// Accumulated text of one diagnosed error/warning before location
/// resolution.
#[derive(Debug, Clone)]
struct RawProblem {
    kind: ProblemKind,
    lines: Vec<String>,
    number: Option<String>,
}

impl RawProblem {
    fn message(&self) -> String {
        let trimmed: Vec<&str> = self.lines.iter().map(|line| line.trim()).collect();
        trimmed.join(" ")
    }
}

/// One indicator line plus the problem-number rows beneath it.
#[derive(Debug, Clone)]
struct LocationGroup {
    indicator: String,
    number_lines: Vec<String>,
}

/// The log's reproduction of one logical source statement, plus the
/// annotation groups that followed it.
#[derive(Debug, Clone, Default)]
struct SourceContext {
    lines: Vec<String>,
    groups: Vec<LocationGroup>,
}

/// A column span bound to a problem number at a given log line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProblemLocation {
    line: usize,
    start_column: usize,
    end_column: usize,
    number: String,
}

/// Offset between the log's numbering and the submitted code, diffed from the
/// echo of the first submitted line.
#[derive(Debug, Clone, Copy)]
struct MarkerOffset {
    line: usize,
    column: usize,
}

/// Parse the contiguous `-`/`_` runs of an indicator line into half-open
/// character-column spans.
fn parse_indicator_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;
    let mut column = 0;
    for ch in text.chars() {
        if ch == '-' || ch == '_' {
            if open.is_none() {
                open = Some(column);
            }
        } else if let Some(start) = open.take() {
            spans.push((start, column));
        }
        column += 1;
    }
    if let Some(start) = open {
        spans.push((start, column));
    }
    spans
}

/// Parse a problem-number row into `(column, token)` labels.
fn parse_labels(text: &str) -> Vec<(usize, String)> {
    LABEL
        .find_iter(text)
        .map(|m| {
            let column = text[..m.start()].chars().count();
            (column, m.as_str().to_string())
        })
        .collect()
}

/// Split spans so that every label column starts a span of its own.
///
/// Handles one underline covering several stacked numbers: a row with more
/// labels than spans inserts a boundary at each extra label's column.
fn rederive_spans(spans: &[(usize, usize)], labels: &[(usize, String)]) -> Vec<(usize, usize)> {
    let mut spans = spans.to_vec();
    for (column, _) in labels {
        if spans.iter().any(|(start, _)| start == column) {
            continue;
        }
        if let Some(idx) = spans
            .iter()
            .position(|(start, end)| start < column && column < end)
        {
            let (start, end) = spans[idx];
            spans[idx] = (start, *column);
            spans.insert(idx + 1, (*column, end));
        }
    }
    spans
}

/// Stably reorder locations so entries sharing `(start_column, number)` are
/// contiguous (two stacked number rows naming the same column).
fn regroup_contiguous(locations: Vec<ProblemLocation>) -> Vec<ProblemLocation> {
    let mut out: Vec<ProblemLocation> = Vec::with_capacity(locations.len());
    let mut used = vec![false; locations.len()];
    for i in 0..locations.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        out.push(locations[i].clone());
        for j in (i + 1)..locations.len() {
            if !used[j]
                && locations[j].start_column == locations[i].start_column
                && locations[j].number == locations[i].number
            {
                used[j] = true;
                out.push(locations[j].clone());
            }
        }
    }
    out
}

/// Per-invocation scan state. Not reentrant: one value per completed
/// execution's log.
struct Extractor {
    marker: MarkerOffset,
    context: SourceContext,
    batch: Vec<RawProblem>,
    legacy: Vec<ProblemLocation>,
    output: Vec<Problem>,
}

impl Extractor {
    fn new(marker: MarkerOffset) -> Self {
        Self {
            marker,
            context: SourceContext::default(),
            batch: Vec::new(),
            legacy: Vec::new(),
            output: Vec::new(),
        }
    }

    fn scan(&mut self, line: &LogLine) {
        if line.kind == LogLineKind::Source {
            if !line.text.trim().is_empty() && !is_line_number_stub(&line.text) {
                self.apply_source_line(&line.text);
            }
            return;
        }

        if INDICATOR_LINE.is_match(&line.text) {
            self.context.groups.push(LocationGroup {
                indicator: line.text.clone(),
                number_lines: Vec::new(),
            });
            return;
        }

        if NUMBER_LINE.is_match(&line.text) {
            // Ignored when no indicator line opened a group yet.
            if let Some(group) = self.context.groups.last_mut() {
                group.number_lines.push(line.text.clone());
            }
            return;
        }

        if line.kind.is_diagnostic() {
            let kind = if line.kind == LogLineKind::Error {
                ProblemKind::Error
            } else {
                ProblemKind::Warning
            };
            if let Some(caps) = HEADER.captures(&line.text) {
                self.batch.push(RawProblem {
                    kind,
                    lines: vec![line.text.clone()],
                    number: caps.get(3).map(|m| m.as_str().to_string()),
                });
            } else if let Some(current) = self.batch.last_mut() {
                current.lines.push(line.text.clone());
            }
        }
    }

    fn apply_source_line(&mut self, text: &str) {
        let identical = self
            .context
            .lines
            .last()
            .is_some_and(|last| last.trim() == text.trim());
        if identical {
            return;
        }

        if !self.batch.is_empty() && !self.context.lines.is_empty() {
            self.flush();
        }

        if !is_wrapped_continuation(text) {
            self.context = SourceContext {
                lines: vec![text.to_string()],
                groups: Vec::new(),
            };
            return;
        }

        let Some(last) = self.context.lines.last().cloned() else {
            self.context = SourceContext {
                lines: vec![text.to_string()],
                groups: Vec::new(),
            };
            return;
        };

        let new = parse_source_echo(text);
        let old = parse_source_echo(&last);
        if new.line_number != old.line_number {
            self.context = SourceContext {
                lines: vec![text.to_string()],
                groups: Vec::new(),
            };
            return;
        }

        let old_code = old.code.trim_end();
        let new_code = new.code.trim_end();
        if let Some(column) = splice_column(old_code, new_code) {
            let kept: String = last.chars().take(old.code_column + column).collect();
            let merged = format!("{kept}{new_code}");
            let last_index = self.context.lines.len() - 1;
            self.context.lines[last_index] = merged;
        } else {
            self.context.lines.push(text.to_string());
        }
    }

    /// Resolve the current context's annotation groups into locations, in
    /// row-major order, with log-line and column corrections applied.
    fn resolve_locations(&self) -> Vec<ProblemLocation> {
        let Some(first) = self.context.lines.first() else {
            return Vec::new();
        };
        let echo = parse_source_echo(first);
        let line = echo.line_number.unwrap_or(self.marker.line);

        // One logical statement may span several echo lines; columns measured
        // on a later fragment continue after the earlier fragments' text.
        let mut correction = -(self.marker.column as i64);
        let prior = &self.context.lines[..self.context.lines.len() - 1];
        for fragment in prior {
            correction += fragment.trim_end().chars().count() as i64 + 1;
        }

        let mut locations = Vec::new();
        for group in &self.context.groups {
            let mut spans = parse_indicator_spans(&group.indicator);
            if spans.is_empty() {
                continue;
            }
            let rows: Vec<Vec<(usize, String)>> = group
                .number_lines
                .iter()
                .map(|row| parse_labels(row))
                .collect();
            for row in &rows {
                if row.len() > spans.len() {
                    spans = rederive_spans(&spans, row);
                }
            }
            for row in &rows {
                for (column, number) in row {
                    let Some(&(start, end)) = spans.iter().find(|(start, _)| start == column)
                    else {
                        continue;
                    };
                    let start = (start as i64 + correction).max(0) as usize;
                    let end = ((end as i64 + correction).max(start as i64 + 1)) as usize;
                    locations.push(ProblemLocation {
                        line,
                        start_column: start,
                        end_column: end,
                        number: number.clone(),
                    });
                }
            }
        }

        regroup_contiguous(locations)
    }

    /// Fallback span: first non-whitespace character through the trimmed end
    /// of the echoed statement, appended fragments included.
    fn general_location(&self) -> (usize, usize, usize) {
        let Some((first, rest)) = self.context.lines.split_first() else {
            return (self.marker.line, 0, 1);
        };
        let echo = parse_source_echo(first);
        let line = echo.line_number.unwrap_or(self.marker.line);
        let code = echo.code.as_str();
        let start = code.chars().count() - code.trim_start().chars().count();
        let mut end = code.trim_end().chars().count();
        for fragment in rest {
            end += parse_source_echo(fragment).code.trim_end().chars().count() + 1;
        }
        (line, start, end.max(start + 1))
    }

    fn flush(&mut self) {
        let current = self.resolve_locations();
        let pool: Vec<(ProblemLocation, bool)> = self
            .legacy
            .drain(..)
            .map(|loc| (loc, true))
            .chain(current.into_iter().map(|loc| (loc, false)))
            .collect();

        let count = self.batch.len();
        let mut cursors: HashMap<String, usize> = HashMap::new();
        let mut matched: HashSet<usize> = HashSet::new();
        let mut located: Vec<Problem> = Vec::new();
        let mut next_legacy: Vec<ProblemLocation> = Vec::new();

        for (location, is_legacy) in pool {
            let mut found = None;
            if count > 0 {
                let start = cursors.get(&location.number).copied().unwrap_or(0) % count;
                for step in 0..count {
                    let index = (start + step) % count;
                    if self.batch[index].number.as_deref() == Some(location.number.as_str()) {
                        found = Some(index);
                        break;
                    }
                }
            }
            match found {
                Some(index) => {
                    cursors.insert(location.number.clone(), (index + 1) % count);
                    matched.insert(index);
                    located.push(Problem::new(
                        location.line,
                        location.start_column,
                        location.end_column,
                        self.batch[index].message(),
                        self.batch[index].kind,
                    ));
                }
                None if !is_legacy => next_legacy.push(location),
                None => {}
            }
        }

        let (line, start, end) = self.general_location();
        for raw in self.batch.iter().filter(|raw| raw.number.is_none()) {
            self.output
                .push(Problem::new(line, start, end, raw.message(), raw.kind));
        }
        self.output.extend(located);
        for (index, raw) in self.batch.iter().enumerate() {
            if raw.number.is_some() && !matched.contains(&index) {
                self.output
                    .push(Problem::new(line, start, end, raw.message(), raw.kind));
            }
        }

        self.batch.clear();
        self.context.groups.clear();
        self.legacy = next_legacy;
    }
}

/// Column where `new_code` should be spliced into `old_code`, if the two
/// fragments overlap (the engine re-echoes overlapping text around the
/// truncation point).
fn splice_column(old_code: &str, new_code: &str) -> Option<usize> {
    if old_code.is_empty() || new_code.is_empty() {
        return None;
    }
    if let Some(byte) = old_code.find(new_code) {
        return Some(old_code[..byte].chars().count());
    }
    let old: Vec<char> = old_code.chars().collect();
    let new: Vec<char> = new_code.chars().collect();
    let max = old.len().min(new.len());
    for overlap in (1..=max).rev() {
        if old[old.len() - overlap..] == new[..overlap] {
            return Some(old.len() - overlap);
        }
    }
    None
}

/// Locate the start of the relevant execution: the last log line whose
/// decoded source text trims-equal to the first submitted line.
fn find_start(lines: &[LogLine], marker: &str) -> Option<usize> {
    let mut start = None;
    for (index, line) in lines.iter().enumerate() {
        if line.kind == LogLineKind::Source && parse_source_echo(&line.text).code.trim() == marker
        {
            start = Some(index);
        }
    }
    start
}

/// Extract diagnosed problems from one completed execution's log.
///
/// `first_submitted_line` is the first line of the code that was actually
/// submitted (wrapping included); log lines before its last echo belong to
/// earlier activity and are discarded. If the marker is empty or cannot be
/// found, the result is empty, indistinguishable from a clean run.
///
/// Output coordinates are log-relative: the engine's printed line numbers,
/// with half-open column spans measured against the echoed code text.
pub fn extract_problems(lines: &[LogLine], first_submitted_line: &str) -> Vec<Problem> {
    let marker = first_submitted_line.trim();
    if marker.is_empty() || lines.is_empty() {
        return Vec::new();
    }
    let Some(start) = find_start(lines, marker) else {
        return Vec::new();
    };

    let echo_text = &lines[start].text;
    let echo = parse_source_echo(echo_text);
    let marker_offset = MarkerOffset {
        line: echo.line_number.unwrap_or(1),
        column: char_column_of(echo_text, marker).unwrap_or(echo.code_column),
    };

    let mut extractor = Extractor::new(marker_offset);
    for line in &lines[start..] {
        extractor.scan(line);
    }
    if !extractor.batch.is_empty() {
        extractor.flush();
    }
    extractor.output
}
