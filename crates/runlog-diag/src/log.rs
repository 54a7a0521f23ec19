//! Classified log lines and source-echo decoding.
//!
//! The transport layer tags each line of engine output with a semantic
//! category before it reaches this crate. Source echoes carry the engine's own
//! line numbering (`"   65  call symputx(...)"`), and lines too long for the
//! log width are re-echoed as wrapped continuations (`"65  ! more code"`).
//! The helpers here decode those shapes; columns are character offsets.

use once_cell::sync::Lazy;
use regex::Regex;

/// Semantic category of one log line, assigned by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLineKind {
    /// Ordinary output.
    Normal,
    /// Output the engine asked to highlight.
    Highlighted,
    /// Echo of submitted source code.
    Source,
    /// Page title line.
    Title,
    /// Byline.
    Byline,
    /// Page footnote line.
    Footnote,
    /// Error text.
    Error,
    /// Warning text.
    Warning,
    /// Note text.
    Note,
    /// Engine message text.
    Message,
}

impl LogLineKind {
    /// Returns `true` for the categories that can carry diagnosed problems.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Error | Self::Warning)
    }
}

/// One line of the engine's textual log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Semantic category.
    pub kind: LogLineKind,
    /// Raw line text, without trailing newline.
    pub text: String,
}

impl LogLine {
    /// Create a new classified log line.
    pub fn new(kind: LogLineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

static SOURCE_ECHO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*(!?)\s?(.*)$").expect("source echo pattern"));
static LINE_NUMBER_STUB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s*$").expect("stub pattern"));
static WRAPPED_CONTINUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s*!\s").expect("continuation pattern"));

/// A decoded source-echo line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEcho {
    /// The engine's printed line number, if the echo carries one.
    pub line_number: Option<usize>,
    /// The echoed code text (prefix stripped).
    pub code: String,
    /// Character column at which `code` starts within the raw line.
    pub code_column: usize,
    /// Whether this echo is a wrapped continuation of the previous one.
    pub continuation: bool,
}

/// Decode a source-echo line into its line number and code text.
///
/// Lines without a numeric prefix decode to the whole text at column 0.
pub fn parse_source_echo(text: &str) -> SourceEcho {
    if let Some(caps) = SOURCE_ECHO.captures(text) {
        let number = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok());
        if let Some(line_number) = number {
            let code_match = caps.get(3).expect("echo code group");
            let code_column = text[..code_match.start()].chars().count();
            return SourceEcho {
                line_number: Some(line_number),
                code: code_match.as_str().to_string(),
                code_column,
                continuation: !caps[2].is_empty(),
            };
        }
    }
    SourceEcho {
        line_number: None,
        code: text.to_string(),
        code_column: 0,
        continuation: false,
    }
}

/// Returns `true` for echo lines that carry a line number but no code.
pub fn is_line_number_stub(text: &str) -> bool {
    LINE_NUMBER_STUB.is_match(text)
}

/// Returns `true` for the engine's line-length-truncation marker
/// (`digits`, optional spaces, `!`, code).
pub fn is_wrapped_continuation(text: &str) -> bool {
    WRAPPED_CONTINUATION.is_match(text)
}

/// Character column of the first occurrence of `needle` within `haystack`.
pub(crate) fn char_column_of(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte| haystack[..byte].chars().count())
}
