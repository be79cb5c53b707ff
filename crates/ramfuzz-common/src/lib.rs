mod span;
mod source;

pub use span::{Span, Spanned};
pub use source::{Location, SourceFile, SourceId, SourceMap};
