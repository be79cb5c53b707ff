use ramfuzz_common::Span;
use smol_str::SmolStr;

/// C++ access specifier for class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    Public,
    Protected,
    #[default]
    Private,
}

impl Access {
    /// Parse the keyword of an access label (`public`, `protected`, `private`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim() {
            "public" => Some(Access::Public),
            "protected" => Some(Access::Protected),
            "private" => Some(Access::Private),
            _ => None,
        }
    }
}

/// What kind of member function a declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Constructor,
    Destructor,
    /// Any other member function, operators and conversion functions included.
    Method,
}

/// One member function declared directly in a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    /// Name as the compiler spells it: `spin`, `operator+`, `~Widget`,
    /// `operator int`.
    pub name: SmolStr,
    pub kind: MemberKind,
    pub access: Access,
    pub is_static: bool,
    pub span: Span,
}

impl MemberDecl {
    pub fn new(name: impl Into<SmolStr>, kind: MemberKind, access: Access, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            access,
            is_static: false,
            span,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn is_public(&self) -> bool {
        self.access == Access::Public
    }
}
