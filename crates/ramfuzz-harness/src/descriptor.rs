//! Per-class harness shape.

use crate::filter::member_eligible;
use crate::mangle::valid_ident;
use ramfuzz_decl::{ClassDecl, MemberDecl, MemberKind};
use rustc_hash::FxHashMap;
use std::fmt;

/// Name of one generated stub: the mangled member name followed by its
/// occurrence index among members with the same mangled name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedIdent {
    pub base: String,
    pub index: u32,
}

impl fmt::Display for GeneratedIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.index)
    }
}

/// How a stub is declared in the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubKind {
    /// Returns a freshly constructed instance of the class under test.
    Constructor,
    /// Invokes a method on the object under test; listed in the dispatch table.
    Method,
}

/// One eligible member and the stub generated for it.
#[derive(Debug, Clone)]
pub struct HarnessStub<'a> {
    pub member: &'a MemberDecl,
    pub kind: StubKind,
    pub ident: GeneratedIdent,
}

/// Everything needed to emit the wrapper for one class.
#[derive(Debug, Clone)]
pub struct HarnessDescriptor<'a> {
    pub class: &'a ClassDecl,
    /// Name of the generated wrapper type, e.g. `RF__Widget`.
    pub type_name: String,
    /// Stubs in member declaration order.
    pub stubs: Vec<HarnessStub<'a>>,
    pub constructor_count: usize,
    pub method_count: usize,
}

impl<'a> HarnessDescriptor<'a> {
    /// Walk the class's own members in declaration order and assign a stub
    /// to each eligible one.
    pub fn build(class: &'a ClassDecl, class_prefix: &str) -> Self {
        let mut occurrences: FxHashMap<String, u32> = FxHashMap::default();
        let mut stubs = Vec::new();
        let mut constructor_count = 0;
        let mut method_count = 0;

        for member in &class.members {
            if !member_eligible(member) {
                tracing::trace!(
                    class = %class.qualified_name,
                    member = %member.name,
                    "skipping ineligible member"
                );
                continue;
            }
            let kind = match member.kind {
                MemberKind::Constructor => StubKind::Constructor,
                MemberKind::Method => StubKind::Method,
                MemberKind::Destructor => continue,
            };

            let base = valid_ident(&member.name);
            let counter = occurrences.entry(base.clone()).or_insert(0);
            let ident = GeneratedIdent {
                base,
                index: *counter,
            };
            *counter += 1;

            match kind {
                StubKind::Constructor => constructor_count += 1,
                StubKind::Method => method_count += 1,
            }
            stubs.push(HarnessStub {
                member,
                kind,
                ident,
            });
        }

        Self {
            class,
            type_name: format!("{}{}", class_prefix, class.name),
            stubs,
            constructor_count,
            method_count,
        }
    }

    pub fn has_constructors(&self) -> bool {
        self.constructor_count > 0
    }

    /// Stubs that go into the dispatch table, in table order.
    pub fn methods(&self) -> impl Iterator<Item = &HarnessStub<'a>> {
        self.stubs.iter().filter(|s| s.kind == StubKind::Method)
    }
}
