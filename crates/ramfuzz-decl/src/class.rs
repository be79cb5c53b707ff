use crate::member::{Access, MemberDecl};
use ramfuzz_common::Span;
use smol_str::SmolStr;

/// Which keyword introduced a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassTag {
    Class,
    Struct,
    Union,
}

impl ClassTag {
    /// Access of members that precede any access label.
    pub fn default_access(self) -> Access {
        match self {
            ClassTag::Class => Access::Private,
            ClassTag::Struct | ClassTag::Union => Access::Public,
        }
    }
}

/// The kind of scope a class is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeKind {
    /// Global or named namespace scope (possibly nested in other classes).
    #[default]
    Named,
    /// Somewhere below an anonymous namespace.
    Anonymous,
}

/// Where a class definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    /// Defined in the file handed to the front end.
    #[default]
    MainFile,
    /// Defined in a file reached through `#include`.
    Included,
}

/// A class, struct or union definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    /// Fully qualified name, e.g. `geo::Shape::Corner`.
    pub qualified_name: String,
    pub name: SmolStr,
    pub tag: ClassTag,
    /// Member functions declared directly in the body, in declaration order.
    pub members: Vec<MemberDecl>,
    /// Member function templates declared directly in the body.
    pub member_templates: Vec<MemberDecl>,
    /// Classes defined inside this one.
    pub nested: Vec<ClassDecl>,
    /// Nested class templates and unnamed nested classes. Their member
    /// functions count for the subtree check, but they never get a harness.
    pub subtree_only: Vec<ClassDecl>,
    pub scope: ScopeKind,
    pub provenance: Provenance,
    pub span: Span,
}

impl ClassDecl {
    pub fn new(
        qualified_name: impl Into<String>,
        name: impl Into<SmolStr>,
        tag: ClassTag,
        span: Span,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            name: name.into(),
            tag,
            members: Vec::new(),
            member_templates: Vec::new(),
            nested: Vec::new(),
            subtree_only: Vec::new(),
            scope: ScopeKind::Named,
            provenance: Provenance::MainFile,
            span,
        }
    }

    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_nested(mut self, nested: ClassDecl) -> Self {
        self.nested.push(nested);
        self
    }

    pub fn with_subtree_only(mut self, hidden: ClassDecl) -> Self {
        self.subtree_only.push(hidden);
        self
    }

    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Whether any public member function is declared anywhere below this
    /// class: its own members, its member templates, or any nested class
    /// (templates and unnamed ones included).
    pub fn has_public_method_in_subtree(&self) -> bool {
        self.members.iter().any(MemberDecl::is_public)
            || self.member_templates.iter().any(MemberDecl::is_public)
            || self
                .nested
                .iter()
                .chain(&self.subtree_only)
                .any(ClassDecl::has_public_method_in_subtree)
    }

    /// This class followed by all candidate classes nested in it, outermost
    /// first. `subtree_only` classes are not visited.
    pub fn walk(&self) -> ClassWalk<'_> {
        ClassWalk { stack: vec![self] }
    }
}

/// Pre-order iterator over a class and its nested classes.
pub struct ClassWalk<'a> {
    stack: Vec<&'a ClassDecl>,
}

impl<'a> Iterator for ClassWalk<'a> {
    type Item = &'a ClassDecl;

    fn next(&mut self) -> Option<Self::Item> {
        let class = self.stack.pop()?;
        self.stack.extend(class.nested.iter().rev());
        Some(class)
    }
}
