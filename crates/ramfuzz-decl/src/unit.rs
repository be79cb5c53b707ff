use crate::class::ClassDecl;
use ramfuzz_common::{SourceId, Spanned};

/// Everything the front end extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnitDecls {
    pub source: SourceId,
    /// Outermost class definitions, in source order.
    pub classes: Vec<ClassDecl>,
    /// Targets of quoted `#include "..."` directives, in source order.
    pub includes: Vec<Spanned<String>>,
}

impl TranslationUnitDecls {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            classes: Vec::new(),
            includes: Vec::new(),
        }
    }

    /// Every class definition in the unit, nested ones right after their
    /// enclosing class.
    pub fn all_classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.iter().flat_map(ClassDecl::walk)
    }
}
