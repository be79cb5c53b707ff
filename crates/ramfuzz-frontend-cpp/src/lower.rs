use ramfuzz_common::{SourceFile, Span, Spanned};
use ramfuzz_decl::{
    Access, ClassDecl, ClassTag, MemberDecl, MemberKind, Provenance, ScopeKind,
    TranslationUnitDecls,
};
use tree_sitter::{Node, Tree};

/// Lower a tree-sitter Tree to the class declarations it defines.
pub fn lower(tree: &Tree, source: &SourceFile, provenance: Provenance) -> TranslationUnitDecls {
    let ctx = LoweringContext::new(source, provenance);
    let mut unit = TranslationUnitDecls::new(source.id);
    ctx.lower_item(tree.root_node(), &Scope::default(), &mut unit);
    unit
}

/// The namespace/class path a declaration lives in.
#[derive(Debug, Clone, Default)]
struct Scope {
    path: Vec<String>,
    kind: ScopeKind,
}

impl Scope {
    fn qualify(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.path.join("::"), name)
        }
    }

    fn enter<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Scope {
        let mut path = self.path.clone();
        path.extend(segments.into_iter().map(str::to_string));
        Scope {
            path,
            kind: self.kind,
        }
    }

    fn anonymous(&self) -> Scope {
        Scope {
            path: self.path.clone(),
            kind: ScopeKind::Anonymous,
        }
    }
}

struct LoweringContext<'a> {
    source: &'a SourceFile,
    provenance: Provenance,
}

impl<'a> LoweringContext<'a> {
    fn new(source: &'a SourceFile, provenance: Provenance) -> Self {
        Self { source, provenance }
    }

    fn span(&self, node: Node) -> Span {
        Span::from_range(self.source.id, node.byte_range())
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.content.as_bytes()).unwrap_or("")
    }

    fn lower_children(&self, node: Node, scope: &Scope, unit: &mut TranslationUnitDecls) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.lower_item(child, scope, unit);
        }
    }

    fn lower_item(&self, node: Node, scope: &Scope, unit: &mut TranslationUnitDecls) {
        match node.kind() {
            "translation_unit" | "declaration_list" | "preproc_if" | "preproc_ifdef"
            | "preproc_else" | "preproc_elif" | "preproc_elifdef" => {
                self.lower_children(node, scope, unit);
            }
            "namespace_definition" => {
                let Some(body) = node.child_by_field_name("body") else {
                    return;
                };
                let inner = match node.child_by_field_name("name") {
                    Some(name) => scope.enter(namespace_segments(self.text(name))),
                    None => scope.anonymous(),
                };
                self.lower_children(body, &inner, unit);
            }
            "linkage_specification" => {
                // extern "C++" { ... } or extern "C++" class X { ... };
                if let Some(body) = node.child_by_field_name("body") {
                    self.lower_item(body, scope, unit);
                }
            }
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                if let Some(class) = self.lower_class(node, scope) {
                    unit.classes.push(class);
                }
            }
            "declaration" | "type_definition" => {
                // class X { ... } x;  /  typedef struct X { ... } Y;
                if let Some(ty) = node.child_by_field_name("type") {
                    if class_tag(ty.kind()).is_some() {
                        self.lower_item(ty, scope, unit);
                    }
                }
            }
            "preproc_include" => {
                if let Some(path) = node.child_by_field_name("path") {
                    if path.kind() == "string_literal" {
                        let target = self.text(path).trim_matches('"').to_string();
                        unit.includes.push(Spanned::new(target, self.span(path)));
                    }
                }
            }
            // Class templates and classes local to function bodies are not
            // candidates.
            _ => {}
        }
    }

    fn lower_class(&self, node: Node, scope: &Scope) -> Option<ClassDecl> {
        let tag = class_tag(node.kind())?;
        let name_node = node.child_by_field_name("name")?;
        let body = node.child_by_field_name("body")?;

        let spelled: String = match name_node.kind() {
            "type_identifier" => self.text(name_node).to_string(),
            // class Outer::Inner { ... } defined outside Outer
            "qualified_identifier" | "qualified_type_identifier" => {
                strip_whitespace(self.text(name_node))
            }
            _ => return None,
        };
        let segments: Vec<&str> = spelled
            .trim_start_matches("::")
            .split("::")
            .filter(|s| !s.is_empty())
            .collect();
        segments.last()?;

        Some(self.lower_class_body(node, body, tag, &segments, scope))
    }

    /// A nested class template or unnamed nested class. Only its member
    /// functions matter, for the enclosing class's subtree check.
    fn lower_subtree_only(&self, node: Node, scope: &Scope) -> Option<ClassDecl> {
        let tag = class_tag(node.kind())?;
        let body = node.child_by_field_name("body")?;
        let name = match node.child_by_field_name("name") {
            Some(name) => strip_whitespace(self.text(name)),
            None => format!("(anonymous {})", self.text(node.child(0)?)),
        };
        Some(self.lower_class_body(node, body, tag, &[name.as_str()], scope))
    }

    fn lower_class_body(
        &self,
        node: Node,
        body: Node,
        tag: ClassTag,
        segments: &[&str],
        scope: &Scope,
    ) -> ClassDecl {
        let name = segments.last().copied().unwrap_or_default();
        let mut class = ClassDecl::new(scope.qualify(&segments.join("::")), name, tag, self.span(node))
            .with_scope(scope.kind)
            .with_provenance(self.provenance);

        let inner = scope.enter(segments.iter().copied());
        let mut access = tag.default_access();
        self.lower_members(body, &inner, &mut class, &mut access);
        class
    }

    /// Nested class defined by a member declaration's type, if any.
    fn lower_nested(&self, decl: Node, scope: &Scope, class: &mut ClassDecl, in_template: bool) {
        let Some(ty) = decl.child_by_field_name("type") else {
            return;
        };
        if class_tag(ty.kind()).is_none() {
            return;
        }
        let unnamed = ty.child_by_field_name("name").is_none();
        if in_template || unnamed {
            if let Some(hidden) = self.lower_subtree_only(ty, scope) {
                class.subtree_only.push(hidden);
            }
        } else if let Some(nested) = self.lower_class(ty, scope) {
            class.nested.push(nested);
        }
    }

    /// Collect the member functions and nested classes of a class body.
    ///
    /// `access` carries the current access label across preprocessor blocks.
    fn lower_members(&self, list: Node, scope: &Scope, class: &mut ClassDecl, access: &mut Access) {
        let mut cursor = list.walk();
        for child in list.children(&mut cursor) {
            match child.kind() {
                "access_specifier" => {
                    if let Some(label) = Access::from_keyword(self.text(child)) {
                        *access = label;
                    }
                }
                "field_declaration" | "declaration" | "function_definition" => {
                    self.lower_nested(child, scope, class, false);
                    let members = self.lower_member_functions(child, &class.name, *access);
                    class.members.extend(members);
                }
                "template_declaration" => {
                    let mut inner_cursor = child.walk();
                    for inner in child.children(&mut inner_cursor) {
                        match inner.kind() {
                            "field_declaration" | "declaration" | "function_definition" => {
                                self.lower_nested(inner, scope, class, true);
                                let members =
                                    self.lower_member_functions(inner, &class.name, *access);
                                class.member_templates.extend(members);
                            }
                            "class_specifier" | "struct_specifier" | "union_specifier" => {
                                if let Some(hidden) = self.lower_subtree_only(inner, scope) {
                                    class.subtree_only.push(hidden);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif"
                | "preproc_elifdef" => {
                    self.lower_members(child, scope, class, access);
                }
                // friend declarations, data-only items, aliases, using-declarations
                _ => {}
            }
        }
    }

    /// The member functions a single member declaration introduces.
    fn lower_member_functions(&self, decl: Node, class_name: &str, access: Access) -> Vec<MemberDecl> {
        let is_static = self.has_static_specifier(decl);
        let span = self.span(decl);

        let mut cursor = decl.walk();
        decl.children_by_field_name("declarator", &mut cursor)
            .filter_map(|declarator| self.function_name(declarator))
            .map(|(name, is_destructor)| {
                let kind = if is_destructor {
                    MemberKind::Destructor
                } else if name == class_name {
                    MemberKind::Constructor
                } else {
                    MemberKind::Method
                };
                let is_static = is_static || is_implicitly_static(&name);
                MemberDecl::new(name, kind, access, span).with_static(is_static)
            })
            .collect()
    }

    fn has_static_specifier(&self, decl: Node) -> bool {
        let mut cursor = decl.walk();
        let found = decl
            .children(&mut cursor)
            .any(|c| c.kind() == "storage_class_specifier" && self.text(c).trim() == "static");
        found
    }

    /// Name of the function a declarator declares, with a destructor flag.
    /// `None` for data members, including pointers to functions.
    fn function_name(&self, declarator: Node) -> Option<(String, bool)> {
        match declarator.kind() {
            // int* make();  Widget& self_ref();
            "pointer_declarator" | "reference_declarator" | "attributed_declarator" => {
                let inner = declarator
                    .child_by_field_name("declarator")
                    .or_else(|| last_named_child(declarator))?;
                self.function_name(inner)
            }
            "function_declarator" => {
                let name = declarator.child_by_field_name("declarator")?;
                match name.kind() {
                    "field_identifier" | "identifier" => Some((self.text(name).to_string(), false)),
                    "operator_name" => Some((operator_spelling(self.text(name)), false)),
                    "destructor_name" => Some((strip_whitespace(self.text(name)), true)),
                    "template_function" => {
                        let base = name.child_by_field_name("name")?;
                        Some((self.text(base).to_string(), false))
                    }
                    // void (*get())(int);  returns a pointer to function
                    "parenthesized_declarator" => self.function_name(wrapped_function(name)?),
                    _ => None,
                }
            }
            "operator_cast" => Some((self.conversion_spelling(declarator), false)),
            _ => None,
        }
    }

    /// `operator const char*()` is spelled `operator const char *`.
    fn conversion_spelling(&self, node: Node) -> String {
        let text = self.text(node);
        let head = text.split('(').next().unwrap_or(text);
        let target = head.trim().trim_start_matches("operator");
        format!("operator {}", spell_type(target))
    }
}

fn class_tag(kind: &str) -> Option<ClassTag> {
    match kind {
        "class_specifier" => Some(ClassTag::Class),
        "struct_specifier" => Some(ClassTag::Struct),
        "union_specifier" => Some(ClassTag::Union),
        _ => None,
    }
}

/// Allocation and deallocation functions are static members even when not
/// declared `static`.
fn is_implicitly_static(name: &str) -> bool {
    matches!(
        name,
        "operator new" | "operator new[]" | "operator delete" | "operator delete[]"
    )
}

/// The function declarator inside `(*get())`, or `None` for `(*fp)`, which
/// declares a pointer-to-function data member.
fn wrapped_function(node: Node) -> Option<Node> {
    match node.kind() {
        "function_declarator" => Some(node),
        "parenthesized_declarator" | "pointer_declarator" | "reference_declarator" => {
            let inner = node
                .child_by_field_name("declarator")
                .or_else(|| last_named_child(node))?;
            wrapped_function(inner)
        }
        _ => None,
    }
}

fn last_named_child(node: Node) -> Option<Node> {
    let count = node.named_child_count();
    if count == 0 {
        None
    } else {
        node.named_child(count - 1)
    }
}

fn namespace_segments(name: &str) -> Vec<&str> {
    name.split("::")
        .map(|s| {
            let s = s.trim();
            s.strip_prefix("inline ").unwrap_or(s).trim()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `operator +` → `operator+`, `operator  new [ ]` → `operator new[]`.
fn operator_spelling(text: &str) -> String {
    let Some(rest) = text.strip_prefix("operator") else {
        return text.to_string();
    };
    let symbol = strip_whitespace(rest);
    if symbol.starts_with(|c: char| c.is_alphabetic()) {
        format!("operator {symbol}")
    } else {
        format!("operator{symbol}")
    }
}

/// Collapse whitespace and set pointer/reference declarators apart:
/// `const  char*` → `const char *`.
fn spell_type(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len() + 2);
    for c in collapsed.chars() {
        if matches!(c, '*' | '&') && !matches!(out.chars().last(), None | Some(' ' | '*' | '&')) {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use ramfuzz_common::SourceMap;

    fn decls(code: &str) -> TranslationUnitDecls {
        let map = SourceMap::new();
        let id = map.add_file("unit.cc", code.to_string());
        let source = map.get(id).unwrap();
        let tree = parse(&source).expect("parse failed");
        lower(&tree, &source, Provenance::MainFile)
    }

    fn names(class: &ClassDecl) -> Vec<(&str, MemberKind, Access, bool)> {
        class
            .members
            .iter()
            .map(|m| (m.name.as_str(), m.kind, m.access, m.is_static))
            .collect()
    }

    #[test]
    fn test_lower_widget() {
        let unit = decls(
            r#"
class Widget {
public:
    Widget(int size);
    void spin();
    Widget operator+(const Widget& other) const;
private:
    void hidden();
};
"#,
        );

        assert_eq!(unit.classes.len(), 1);
        let widget = &unit.classes[0];
        assert_eq!(widget.qualified_name, "Widget");
        assert_eq!(widget.tag, ClassTag::Class);
        assert_eq!(
            names(widget),
            vec![
                ("Widget", MemberKind::Constructor, Access::Public, false),
                ("spin", MemberKind::Method, Access::Public, false),
                ("operator+", MemberKind::Method, Access::Public, false),
                ("hidden", MemberKind::Method, Access::Private, false),
            ]
        );
    }

    #[test]
    fn test_default_access_by_tag() {
        let unit = decls(
            r#"
class C { void f(); };
struct S { void g(); };
"#,
        );

        assert_eq!(unit.classes[0].members[0].access, Access::Private);
        assert_eq!(unit.classes[1].members[0].access, Access::Public);
    }

    #[test]
    fn test_inline_definitions_and_destructor() {
        let unit = decls(
            r#"
struct Counter {
    Counter() : n(0) {}
    ~Counter() {}
    int get() const { return n; }
    int& ref() { return n; }
    static Counter* make();
    int n;
    int (*callback)(int);
};
"#,
        );

        assert_eq!(
            names(&unit.classes[0]),
            vec![
                ("Counter", MemberKind::Constructor, Access::Public, false),
                ("~Counter", MemberKind::Destructor, Access::Public, false),
                ("get", MemberKind::Method, Access::Public, false),
                ("ref", MemberKind::Method, Access::Public, false),
                ("make", MemberKind::Method, Access::Public, true),
            ]
        );
    }

    #[test]
    fn test_operator_spellings() {
        let unit = decls(
            r#"
struct Vec {
    Vec& operator = (const Vec& o);
    double operator[](int i) const;
    void operator()();
    bool operator!=(const Vec& o) const;
    operator bool() const;
};
"#,
        );

        let spelled: Vec<&str> = unit.classes[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            spelled,
            vec!["operator=", "operator[]", "operator()", "operator!=", "operator bool"]
        );
    }

    #[test]
    fn test_namespaces_and_nesting() {
        let unit = decls(
            r#"
namespace geo {
namespace detail {
struct Helper { void help(); };
}
class Shape {
public:
    struct Corner { void move(); };
    void draw();
};
}
namespace {
class Hidden { public: void f(); };
}
"#,
        );

        let all: Vec<(&str, ScopeKind)> = unit
            .all_classes()
            .map(|c| (c.qualified_name.as_str(), c.scope))
            .collect();
        assert_eq!(
            all,
            vec![
                ("geo::detail::Helper", ScopeKind::Named),
                ("geo::Shape", ScopeKind::Named),
                ("geo::Shape::Corner", ScopeKind::Named),
                ("Hidden", ScopeKind::Anonymous),
            ]
        );
        let shape = &unit.classes[1];
        assert_eq!(shape.members.len(), 1);
        assert_eq!(shape.nested[0].members[0].name, "move");
    }

    #[test]
    fn test_allocation_operators_are_static() {
        let unit = decls(
            r#"
struct Pool {
    void* operator new(unsigned long size);
    void* operator new[](unsigned long size);
    void operator delete(void* p);
    void operator delete[](void* p);
    void operator()(int n);
    int operator[](int i);
};
"#,
        );

        assert_eq!(
            names(&unit.classes[0]),
            vec![
                ("operator new", MemberKind::Method, Access::Public, true),
                ("operator new[]", MemberKind::Method, Access::Public, true),
                ("operator delete", MemberKind::Method, Access::Public, true),
                ("operator delete[]", MemberKind::Method, Access::Public, true),
                ("operator()", MemberKind::Method, Access::Public, false),
                ("operator[]", MemberKind::Method, Access::Public, false),
            ]
        );
    }

    #[test]
    fn test_out_of_line_nested_class() {
        let unit = decls(
            r#"
namespace ns {
class R { class S; };
class R::S { public: void go(); };
}
"#,
        );

        let all: Vec<(&str, &str)> = unit
            .all_classes()
            .map(|c| (c.qualified_name.as_str(), c.name.as_str()))
            .collect();
        assert_eq!(all, vec![("ns::R", "R"), ("ns::R::S", "S")]);
        assert_eq!(unit.classes[1].members[0].name, "go");
    }

    #[test]
    fn test_nested_templates_and_unnamed_classes_feed_subtree() {
        let unit = decls(
            r#"
class C { template <class T> struct N { void f(); }; };
class D { struct { void g(); } s; };
"#,
        );

        let all: Vec<&str> = unit.all_classes().map(|c| c.qualified_name.as_str()).collect();
        assert_eq!(all, vec!["C", "D"]);
        for class in &unit.classes {
            assert!(class.members.is_empty());
            assert_eq!(class.subtree_only.len(), 1);
            assert!(class.has_public_method_in_subtree());
        }
        assert_eq!(unit.classes[0].subtree_only[0].members[0].name, "f");
        assert_eq!(unit.classes[1].subtree_only[0].members[0].name, "g");
    }

    #[test]
    fn test_function_returning_function_pointer() {
        let unit = decls(
            r#"
struct B {
    void (*get())(int);
    int (*callback)(int);
};
"#,
        );

        assert_eq!(
            names(&unit.classes[0]),
            vec![("get", MemberKind::Method, Access::Public, false)]
        );
    }

    #[test]
    fn test_nested_namespace_specifier() {
        let unit = decls("namespace a::b { struct X { void f(); }; }");
        assert_eq!(unit.classes[0].qualified_name, "a::b::X");
    }

    #[test]
    fn test_member_templates_are_not_members() {
        let unit = decls(
            r#"
class Box {
public:
    template <typename T> void put(T value);
private:
    void reset();
};
"#,
        );

        let class = &unit.classes[0];
        assert_eq!(class.members.len(), 1);
        assert_eq!(class.member_templates.len(), 1);
        assert_eq!(class.member_templates[0].access, Access::Public);
        assert!(class.has_public_method_in_subtree());
    }

    #[test]
    fn test_skipped_declarations() {
        let unit = decls(
            r#"
class Forward;
template <typename T> class Generic { public: void f(); };
void free_function() {
    struct Local { void g(); };
}
struct { void anon(); } instance;
"#,
        );

        assert!(unit.classes.is_empty());
    }

    #[test]
    fn test_access_survives_preprocessor_blocks() {
        let unit = decls(
            r#"
class P {
#ifdef TESTING
public:
    void inspect();
#endif
    void after();
};
"#,
        );

        let class = &unit.classes[0];
        assert_eq!(class.members.len(), 2);
        assert!(class.members.iter().all(|m| m.access == Access::Public));
    }

    #[test]
    fn test_records_quoted_includes() {
        let unit = decls(
            r#"
#include <memory>
#include "widget.hpp"
#include "util/strings.h"
"#,
        );

        let targets: Vec<&str> = unit.includes.iter().map(|i| i.node.as_str()).collect();
        assert_eq!(targets, vec!["widget.hpp", "util/strings.h"]);
    }

    #[test]
    fn test_provenance_is_stamped() {
        let map = SourceMap::new();
        let id = map.add_file("dep.hpp", "struct D { struct E {}; };".to_string());
        let source = map.get(id).unwrap();
        let tree = parse(&source).unwrap();
        let unit = lower(&tree, &source, Provenance::Included);

        assert!(unit.all_classes().all(|c| c.provenance == Provenance::Included));
        assert_eq!(unit.all_classes().count(), 2);
    }

    #[test]
    fn test_operator_spelling_helpers() {
        assert_eq!(operator_spelling("operator +"), "operator+");
        assert_eq!(operator_spelling("operator new [ ]"), "operator new[]");
        assert_eq!(operator_spelling("operator<<"), "operator<<");
        assert_eq!(spell_type(" const  char*"), "const char *");
        assert_eq!(spell_type("int&&"), "int &&");
    }
}
