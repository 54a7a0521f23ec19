#![warn(missing_docs)]
//! Submission-side support for running analytical-language code from an editor.
//!
//! When the editor submits code to an execution engine it does not send the raw
//! document text: the submitted program is assembled from the selected ranges
//! plus injected boilerplate (program-name assignment, preamble/postamble,
//! output-format wrapper, language wrapper). This crate owns that assembly:
//!
//! - [`Position`] / [`SelectionRange`]: editor coordinates of what was selected
//! - [`selected_text`]: the code text actually submitted
//! - [`SubmitParams`] / [`CodeWrapper`]: the deterministic wrapping procedure
//!
//! The wrapping procedure is deliberately re-runnable: downstream consumers
//! (log diagnostics) re-apply it to locate where user code begins inside the
//! wrapped program, instead of duplicating the assembly logic.

pub mod selection;
pub mod wrap;

pub use selection::{Position, SelectionRange, normalize_selections, selected_text, split_lines};
pub use wrap::{CodeWrapper, SubmitParams, WrapperPair};
