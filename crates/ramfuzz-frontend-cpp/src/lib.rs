mod error;
mod parser;
mod lower;

pub use error::{FrontendError, Result};
pub use parser::parse;
pub use lower::lower;

use ramfuzz_common::SourceFile;
use ramfuzz_decl::{Provenance, TranslationUnitDecls};

/// Parse a C++ source file into its class declarations.
///
/// Fails when tree-sitter cannot make sense of the file; a file without any
/// classes is not an error.
pub fn parse_file(source: &SourceFile, provenance: Provenance) -> Result<TranslationUnitDecls> {
    let tree = parser::parse(source)?;
    Ok(lower::lower(&tree, source, provenance))
}
