//! Front-end failures.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for front-end operations.
pub type Result<T> = std::result::Result<T, FrontendError>;

/// The front end could not produce a declaration model for a unit.
#[derive(Error, Diagnostic, Debug)]
pub enum FrontendError {
    /// The tree-sitter C++ grammar was rejected by the runtime.
    #[error("failed to load C++ grammar: {0}")]
    #[diagnostic(code(ramfuzz::frontend::grammar))]
    Grammar(#[from] tree_sitter::LanguageError),

    /// The parser gave up without producing a tree.
    #[error("parser produced no syntax tree for {path}")]
    #[diagnostic(code(ramfuzz::frontend::no_tree))]
    NoTree { path: String },

    /// The unit contains code the grammar cannot parse.
    #[error("syntax error in {path} at line {line}")]
    #[diagnostic(
        code(ramfuzz::frontend::syntax),
        help("only well-formed C++ can be analyzed; fix the code or exclude the file")
    )]
    Syntax {
        path: String,
        /// 1-based line of the first error.
        line: u32,
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: SourceSpan,
    },

    /// The unit could not be read from disk.
    #[error("failed to read {path}")]
    #[diagnostic(code(ramfuzz::frontend::io))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
