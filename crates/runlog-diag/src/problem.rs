//! Diagnosed problems.

use runlog_submit::Position;

/// Problem severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    /// The engine reported an error.
    Error,
    /// The engine reported a warning.
    Warning,
}

/// One diagnosed error or warning, ready for rendering as an editor-range
/// annotation.
///
/// Straight out of [`extract_problems`](crate::extract_problems) the
/// coordinates are log-relative (the engine's printed 1-based line numbering,
/// columns relative to the echoed code). After
/// [`OffsetReconciler::apply`](crate::OffsetReconciler::apply) they are
/// raw-document coordinates (0-based editor lines). Column spans are half-open
/// character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// Line number of the problem.
    pub line: usize,
    /// Start column (inclusive).
    pub start_column: usize,
    /// End column (exclusive).
    pub end_column: usize,
    /// Joined, trimmed message text.
    pub message: String,
    /// Severity.
    pub kind: ProblemKind,
}

impl Problem {
    /// Create a new problem record.
    pub fn new(
        line: usize,
        start_column: usize,
        end_column: usize,
        message: impl Into<String>,
        kind: ProblemKind,
    ) -> Self {
        Self {
            line,
            start_column,
            end_column,
            message: message.into(),
            kind,
        }
    }

    /// The problem's span as a start/end position pair.
    pub fn range(&self) -> (Position, Position) {
        (
            Position::new(self.line, self.start_column),
            Position::new(self.line, self.end_column),
        )
    }
}
