//! Error types for the autoformat engine.
//!
//! Neither error is raised out of a key or change handler. `ConfigError`
//! comes back from parsing an `EditorConfig`; `EmojiError` is only ever
//! handed to a `DiagnosticsSink` before fallback data is used.

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};

/// A JSON editor configuration that failed to parse.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("invalid editor configuration: {message}")]
#[diagnostic(
    code(loom::config),
    help("every field is optional; unknown fields are rejected")
)]
pub struct ConfigError {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    location: SourceSpan,
    line_col: (usize, usize),
    #[source]
    source: serde_json::Error,
}

impl ConfigError {
    pub fn from_json(src: &str, err: serde_json::Error) -> Self {
        let line_col = (err.line(), err.column());
        let location = SourceSpan::new(SourceOffset::from_location(src, line_col.0, line_col.1), 0);
        Self {
            message: err.to_string(),
            src: NamedSource::new("editor-config.json", src.to_string()),
            location,
            line_col,
            source: err,
        }
    }

    /// 1-based line and column of the failure.
    pub fn line_col(&self) -> (usize, usize) {
        self.line_col
    }

    pub fn offset(&self) -> usize {
        self.location.offset()
    }
}

/// Emoji lookup failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum EmojiError {
    #[error("no emoji matches unified sequence {unified}")]
    #[diagnostic(code(loom::emoji::unknown_sequence))]
    UnknownSequence { unified: String },
}
