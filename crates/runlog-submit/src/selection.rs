//! Selection coordinates and submitted-text extraction.
//!
//! All coordinates are zero-based and counted in characters (Unicode scalar
//! values), not bytes. Column spans are half-open.

use std::cmp::Ordering;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One submitted selection range (`start..end`, start inclusive, end exclusive
/// in column terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    /// Selection start position.
    pub start: Position,
    /// Selection end position.
    pub end: Position,
}

impl SelectionRange {
    /// Create a new selection range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Returns the range with `start <= end` (a backward selection is flipped).
    pub fn normalized(&self) -> Self {
        if self.start <= self.end {
            *self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    /// Returns `true` if the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split text into logical lines.
///
/// Editor semantics: N newlines produce N+1 lines, and CRLF line endings are
/// treated as LF (the trailing `\r` is stripped).
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

fn char_slice(line: &str, start: usize, end: usize) -> String {
    line.chars().skip(start).take(end.saturating_sub(start)).collect()
}

fn clamp_to_document(sel: SelectionRange, lines: &[String]) -> SelectionRange {
    let last_line = lines.len().saturating_sub(1);
    let clamp = |pos: Position| {
        let line = pos.line.min(last_line);
        let column = pos.column.min(lines[line].chars().count());
        Position::new(line, column)
    };
    SelectionRange::new(clamp(sel.start), clamp(sel.end))
}

/// Normalize a set of submitted selections against a document.
///
/// - flips backward selections
/// - clamps out-of-bounds positions to the document
/// - drops empty selections
/// - sorts by start position
///
/// An empty input (or input that collapses to nothing) is replaced by a single
/// whole-document selection, matching what submission does when the user has
/// no active selection.
pub fn normalize_selections(document: &str, selections: &[SelectionRange]) -> Vec<SelectionRange> {
    let lines = split_lines(document);

    let mut normalized: Vec<SelectionRange> = selections
        .iter()
        .map(|sel| clamp_to_document(sel.normalized(), &lines))
        .filter(|sel| !sel.is_empty())
        .collect();
    normalized.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));

    if normalized.is_empty() {
        let last_line = lines.len().saturating_sub(1);
        let end_column = lines[last_line].chars().count();
        normalized.push(SelectionRange::new(
            Position::new(0, 0),
            Position::new(last_line, end_column),
        ));
    }

    normalized
}

/// Extract the text covered by `selections`, in order: the code that is
/// actually sent to the execution engine (before wrapping).
///
/// Selections are newline-joined, so each selection starts on a fresh line of
/// the submitted program.
pub fn selected_text(document: &str, selections: &[SelectionRange]) -> String {
    let lines = split_lines(document);
    let selections = normalize_selections(document, selections);

    let mut pieces: Vec<String> = Vec::with_capacity(selections.len());
    for sel in &selections {
        let mut segment_lines: Vec<String> = Vec::new();
        for line in sel.start.line..=sel.end.line {
            let text = &lines[line];
            let len = text.chars().count();
            let from = if line == sel.start.line { sel.start.column } else { 0 };
            let to = if line == sel.end.line { sel.end.column } else { len };
            segment_lines.push(char_slice(text, from, to));
        }
        pieces.push(segment_lines.join("\n"));
    }

    pieces.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 0) > Position::new(0, 99));
        assert!(Position::new(2, 3) < Position::new(2, 4));
    }

    #[test]
    fn test_normalized_flips_backward_selection() {
        let sel = SelectionRange::new(Position::new(3, 2), Position::new(1, 5));
        let norm = sel.normalized();
        assert_eq!(norm.start, Position::new(1, 5));
        assert_eq!(norm.end, Position::new(3, 2));
    }

    #[test]
    fn test_split_lines_crlf() {
        let lines = split_lines("a\r\nb\nc");
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_selections_default_to_whole_document() {
        let doc = "data x;\nrun;";
        assert_eq!(selected_text(doc, &[]), doc);
    }

    #[test]
    fn test_selected_text_single_line_span() {
        let doc = "abcdefghij\nsecond line";
        let sel = SelectionRange::new(Position::new(0, 2), Position::new(0, 5));
        assert_eq!(selected_text(doc, &[sel]), "cde");
    }

    #[test]
    fn test_selected_text_multi_line_span() {
        let doc = "first\nsecond\nthird";
        let sel = SelectionRange::new(Position::new(0, 3), Position::new(2, 2));
        assert_eq!(selected_text(doc, &[sel]), "st\nsecond\nth");
    }

    #[test]
    fn test_selected_text_joins_selections_with_newline() {
        let doc = "aaa\nbbb\nccc";
        let sels = [
            SelectionRange::new(Position::new(0, 0), Position::new(0, 3)),
            SelectionRange::new(Position::new(2, 0), Position::new(2, 3)),
        ];
        assert_eq!(selected_text(doc, &sels), "aaa\nccc");
    }

    #[test]
    fn test_selection_clamped_to_document_bounds() {
        let doc = "short";
        let sel = SelectionRange::new(Position::new(0, 2), Position::new(9, 99));
        assert_eq!(selected_text(doc, &[sel]), "ort");
    }

    #[test]
    fn test_unicode_columns_are_characters() {
        let doc = "héllo wörld";
        let sel = SelectionRange::new(Position::new(0, 1), Position::new(0, 4));
        assert_eq!(selected_text(doc, &[sel]), "éll");
    }
}
