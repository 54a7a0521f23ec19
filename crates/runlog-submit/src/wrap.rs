//! Deterministic code wrapping.
//!
//! The submitted program is never the bare selection text: the editor injects
//! boilerplate around it so the engine produces routable output (program-name
//! assignment for log attribution, an output-format wrapper, an optional
//! language block for embedded-language execution, plus user-configured
//! preamble/postamble). All fragments are opaque text here; deciding *what*
//! to inject is submission policy and lives upstream.
//!
//! Wrapping must be a pure function of [`SubmitParams`] and the code text:
//! the diagnostics layer re-runs it to locate user code inside the wrapped
//! program, so any hidden state here would desynchronize recovered positions.

use serde::{Deserialize, Serialize};

/// A prefix/suffix pair of wrapper text placed around the code block.
///
/// Either side may span multiple lines; empty strings contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperPair {
    /// Lines emitted before the code.
    #[serde(default)]
    pub prefix: String,
    /// Lines emitted after the code.
    #[serde(default)]
    pub suffix: String,
}

/// Wrapper configuration for one submission.
///
/// Fields mirror the boilerplate the editor injects, in the order it is
/// injected. Every field is optional; an all-`None` value wraps code into
/// itself unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitParams {
    /// Fully rendered program-name assignment line (tells the engine which
    /// editor file the code came from).
    #[serde(default)]
    pub program_name_line: Option<String>,
    /// Text emitted before the code block.
    #[serde(default)]
    pub preamble: Option<String>,
    /// Text emitted after the code block.
    #[serde(default)]
    pub postamble: Option<String>,
    /// Output-format wrapper (e.g. routing results to an HTML stream).
    #[serde(default)]
    pub output_wrapper: Option<WrapperPair>,
    /// Language wrapper embedding the code in a query or external-language
    /// block.
    #[serde(default)]
    pub language_wrapper: Option<WrapperPair>,
}

/// The wrapping procedure used at submission time.
///
/// Consumers that need to reason about wrapped-code line numbers call into an
/// implementation of this trait instead of reimplementing the assembly.
pub trait CodeWrapper {
    /// Wrap `code` exactly as it would be wrapped for submission.
    fn wrap(&self, code: &str) -> String;
}

fn push_fragment(lines: &mut Vec<String>, fragment: &str) {
    if fragment.is_empty() {
        return;
    }
    for line in fragment.split('\n') {
        lines.push(line.strip_suffix('\r').unwrap_or(line).to_string());
    }
}

impl CodeWrapper for SubmitParams {
    fn wrap(&self, code: &str) -> String {
        let mut lines: Vec<String> = Vec::new();

        if let Some(program) = &self.program_name_line {
            push_fragment(&mut lines, program);
        }
        if let Some(preamble) = &self.preamble {
            push_fragment(&mut lines, preamble);
        }
        if let Some(output) = &self.output_wrapper {
            push_fragment(&mut lines, &output.prefix);
        }
        if let Some(language) = &self.language_wrapper {
            push_fragment(&mut lines, &language.prefix);
        }

        push_fragment(&mut lines, code);

        if let Some(language) = &self.language_wrapper {
            push_fragment(&mut lines, &language.suffix);
        }
        if let Some(output) = &self.output_wrapper {
            push_fragment(&mut lines, &output.suffix);
        }
        if let Some(postamble) = &self.postamble {
            push_fragment(&mut lines, postamble);
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SubmitParams {
        SubmitParams {
            program_name_line: Some("%program 'report.lang';".to_string()),
            preamble: Some("options nonotes;\noptions linesize=max;".to_string()),
            postamble: Some("options notes;".to_string()),
            output_wrapper: Some(WrapperPair {
                prefix: "output open html;".to_string(),
                suffix: "output close html;".to_string(),
            }),
            language_wrapper: None,
        }
    }

    #[test]
    fn test_wrap_order() {
        let wrapped = params().wrap("data x;\nrun;");
        let lines: Vec<&str> = wrapped.split('\n').collect();
        assert_eq!(
            lines,
            vec![
                "%program 'report.lang';",
                "options nonotes;",
                "options linesize=max;",
                "output open html;",
                "data x;",
                "run;",
                "output close html;",
                "options notes;",
            ]
        );
    }

    #[test]
    fn test_wrap_without_params_is_identity() {
        let wrapped = SubmitParams::default().wrap("a\nb");
        assert_eq!(wrapped, "a\nb");
    }

    #[test]
    fn test_language_wrapper_sits_inside_output_wrapper() {
        let params = SubmitParams {
            output_wrapper: Some(WrapperPair {
                prefix: "out-open".to_string(),
                suffix: "out-close".to_string(),
            }),
            language_wrapper: Some(WrapperPair {
                prefix: "submit externallang;".to_string(),
                suffix: "endsubmit;".to_string(),
            }),
            ..SubmitParams::default()
        };
        let wrapped = params.wrap("code");
        assert_eq!(
            wrapped,
            "out-open\nsubmit externallang;\ncode\nendsubmit;\nout-close"
        );
    }

    #[test]
    fn test_wrap_is_deterministic() {
        let params = params();
        assert_eq!(params.wrap("data x;"), params.wrap("data x;"));
    }
}
