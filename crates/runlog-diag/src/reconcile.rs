//! Raw-code offset reconciler.
//!
//! The code the engine executed is not the raw document: selections were
//! concatenated and boilerplate was injected around them, so every position
//! recovered from the log points into the *wrapped* program. This module
//! translates wrapped-code coordinates back into raw-document coordinates.
//!
//! Where user code begins inside the wrapped program is discovered by
//! re-running the submission wrapper over the code with a sentinel line
//! prepended, and finding the wrapped line that carries the sentinel. Calling
//! back into [`CodeWrapper`] keeps this layer from duplicating the assembly
//! logic: if the wrapper changes, the reconciler follows automatically.

use std::collections::BTreeMap;

use ropey::Rope;
use runlog_submit::{CodeWrapper, Position, SelectionRange, normalize_selections, selected_text};

use crate::problem::Problem;

/// Unlikely-to-occur marker used to locate the code block inside the wrapped
/// program. Never submitted to the engine.
const SENTINEL: &str = "__runlog_code_origin_4f9c1d__";

/// Per-raw-line correction between wrapped-code numbering and raw-document
/// numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOffset {
    /// `raw_line - wrapped_line` for this wrapped line.
    pub line_offset: i64,
    /// Column shift: the selection's start column on its first line, else 0.
    pub column_offset: i64,
}

/// Maps wrapped-code positions back to raw-document positions.
///
/// Wrapped-code lines are 1-based (matching the engine's printed numbering
/// for a fresh session); raw-document lines are 0-based editor lines. The
/// map has one entry per raw line actually submitted, so interior lookups are
/// exact and only positions outside the submitted ranges are clamped.
#[derive(Debug)]
pub struct OffsetReconciler {
    document: Rope,
    offsets: BTreeMap<usize, LocationOffset>,
    last_raw_line: usize,
    single_selection_end: Option<Position>,
}

impl OffsetReconciler {
    /// Build a reconciler from the submission parameters: the raw document,
    /// the selections that were submitted (empty ⇒ whole document), and the
    /// wrapping procedure used at submission time.
    pub fn new(document: &str, selections: &[SelectionRange], wrapper: &dyn CodeWrapper) -> Self {
        let selections = normalize_selections(document, selections);
        let code = selected_text(document, &selections);

        let probe = wrapper.wrap(&format!("{SENTINEL}\n{code}"));
        let base = probe
            .split('\n')
            .position(|line| line.contains(SENTINEL))
            .map(|index| index + 1)
            .unwrap_or(1);

        let mut offsets = BTreeMap::new();
        let mut wrapped_line = base;
        for selection in &selections {
            for raw_line in selection.start.line..=selection.end.line {
                let column_offset = if raw_line == selection.start.line {
                    selection.start.column as i64
                } else {
                    0
                };
                offsets.insert(
                    wrapped_line,
                    LocationOffset {
                        line_offset: raw_line as i64 - wrapped_line as i64,
                        column_offset,
                    },
                );
                wrapped_line += 1;
            }
        }

        let last = selections.last().expect("normalized selections are non-empty");
        Self {
            document: Rope::from_str(document),
            offsets,
            last_raw_line: last.end.line,
            single_selection_end: (selections.len() == 1).then_some(last.end),
        }
    }

    /// The offset entry for a wrapped-code line, if that line carries raw
    /// user code.
    pub fn offset_for(&self, wrapped_line: usize) -> Option<LocationOffset> {
        self.offsets.get(&wrapped_line).copied()
    }

    fn line_len(&self, raw_line: usize) -> usize {
        if raw_line >= self.document.len_lines() {
            return 0;
        }
        let mut text = self.document.line(raw_line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        text.chars().count()
    }

    /// Resolve a wrapped-code span to raw-document positions.
    ///
    /// Lines before the first mapped line clamp to the document's first
    /// character; lines past the last mapped line clamp to the last character
    /// of the last submitted raw line with content.
    pub fn resolve(
        &self,
        wrapped_line: usize,
        start_column: usize,
        end_column: usize,
    ) -> (Position, Position) {
        if let Some(offset) = self.offsets.get(&wrapped_line) {
            let raw_line = (wrapped_line as i64 + offset.line_offset).max(0) as usize;
            let line_len = self.line_len(raw_line);
            let start =
                ((start_column as i64 + offset.column_offset).max(0) as usize).min(line_len);
            let end = ((end_column as i64 + offset.column_offset).max(0) as usize)
                .clamp(start, line_len.max(start));
            return (
                Position::new(raw_line, start),
                Position::new(raw_line, end.max(start)),
            );
        }

        let first_mapped = self.offsets.keys().next().copied().unwrap_or(0);
        if wrapped_line < first_mapped {
            return (Position::new(0, 0), Position::new(0, 1));
        }

        let mut raw_line = self.last_raw_line;
        let mut end = match self.single_selection_end {
            Some(position) => position.column.min(self.line_len(raw_line)),
            None => self.line_len(raw_line),
        };
        // A submission ending in a newline ends on an empty raw line; step
        // back to the nearest line with content so the span stays in bounds.
        while end == 0 && raw_line > 0 {
            raw_line -= 1;
            end = self.line_len(raw_line);
        }
        (
            Position::new(raw_line, end.saturating_sub(1)),
            Position::new(raw_line, end),
        )
    }

    /// Rewrite problem coordinates in place from wrapped-code coordinates to
    /// raw-document coordinates.
    pub fn apply(&self, problems: &mut [Problem]) {
        for problem in problems {
            let (start, end) = self.resolve(problem.line, problem.start_column, problem.end_column);
            problem.line = start.line;
            problem.start_column = start.column;
            problem.end_column = end.column;
        }
    }
}
