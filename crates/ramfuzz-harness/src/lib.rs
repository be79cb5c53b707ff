//! Harness scaffolding generation for RamFuzz.
//!
//! Given the classes a translation unit defines, this crate decides which of
//! them get a fuzzing harness and emits one wrapper class per qualifying
//! class:
//!
//! ```text
//! ClassDecl → class_qualifies → HarnessDescriptor::build → HarnessCodeGen
//! ```
//!
//! Nothing here fails: a class either qualifies or is skipped, and a
//! qualifying class always yields a well-formed wrapper.

mod descriptor;
mod emit;
mod filter;
mod mangle;

pub use descriptor::{GeneratedIdent, HarnessDescriptor, HarnessStub, StubKind};
pub use emit::HarnessCodeGen;
pub use filter::{class_qualifies, member_eligible, EligibilityPolicy};
pub use mangle::{valid_ident, SUBSTITUTIONS};

use ramfuzz_decl::{ClassDecl, TranslationUnitDecls};

/// Knobs for the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessOptions {
    /// Namespace wrapping every generated block.
    pub namespace: String,
    /// Prepended to a class's simple name to form the wrapper name.
    pub class_prefix: String,
    pub eligibility: EligibilityPolicy,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            namespace: "ramfuzz".to_string(),
            class_prefix: "RF__".to_string(),
            eligibility: EligibilityPolicy::default(),
        }
    }
}

/// Turns declaration models into harness code.
#[derive(Debug, Clone, Default)]
pub struct HarnessGenerator {
    options: HarnessOptions,
}

impl HarnessGenerator {
    pub fn new(options: HarnessOptions) -> Self {
        Self { options }
    }

    /// Descriptor for a class, or `None` if the class does not qualify.
    pub fn describe<'a>(&self, class: &'a ClassDecl) -> Option<HarnessDescriptor<'a>> {
        if !class_qualifies(class, self.options.eligibility) {
            tracing::trace!(class = %class.qualified_name, "class does not qualify");
            return None;
        }
        Some(HarnessDescriptor::build(class, &self.options.class_prefix))
    }

    /// Descriptors for every qualifying class of a unit, in source order with
    /// nested classes after their enclosing class.
    pub fn descriptors<'a>(
        &'a self,
        unit: &'a TranslationUnitDecls,
    ) -> impl Iterator<Item = HarnessDescriptor<'a>> + 'a {
        unit.all_classes().filter_map(move |class| self.describe(class))
    }

    /// The generated block for one class, if it qualifies.
    pub fn generate_class(&self, class: &ClassDecl) -> Option<String> {
        let desc = self.describe(class)?;
        tracing::debug!(
            class = %class.qualified_name,
            wrapper = %desc.type_name,
            constructors = desc.constructor_count,
            methods = desc.method_count,
            "generating harness"
        );
        Some(HarnessCodeGen::new(&self.options.namespace).generate(desc))
    }

    /// One self-contained block per qualifying class of a unit.
    pub fn blocks<'a>(&'a self, unit: &'a TranslationUnitDecls) -> impl Iterator<Item = String> + 'a {
        unit.all_classes().filter_map(move |class| self.generate_class(class))
    }

    /// All blocks of a unit concatenated.
    pub fn generate(&self, unit: &TranslationUnitDecls) -> String {
        self.blocks(unit).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{class, ctor, method, span};
    use ramfuzz_decl::{Access, ScopeKind};

    fn unit(classes: Vec<ClassDecl>) -> TranslationUnitDecls {
        let mut unit = TranslationUnitDecls::new(span().source);
        unit.classes = classes;
        unit
    }

    #[test]
    fn test_skips_non_qualifying_classes() {
        let u = unit(vec![
            class("Open").with_member(method("go", Access::Public)),
            class("Locked")
                .with_member(ctor("Locked", Access::Private))
                .with_member(method("step", Access::Protected)),
            class("Hidden")
                .with_member(method("go", Access::Public))
                .with_scope(ScopeKind::Anonymous),
        ]);

        let gen = HarnessGenerator::default();
        let names: Vec<String> = gen.descriptors(&u).map(|d| d.type_name).collect();
        assert_eq!(names, vec!["RF__Open"]);
        assert_eq!(gen.blocks(&u).count(), 1);
    }

    #[test]
    fn test_nested_only_class_emits_empty_wrapper_by_default() {
        let u = unit(vec![class("Outer")
            .with_member(method("secret", Access::Private))
            .with_nested(class("Outer::Inner").with_member(method("poke", Access::Public)))]);

        let code = HarnessGenerator::default().generate(&u);
        assert!(code.contains("class RF__Outer {"));
        assert!(code.contains("static mptr roulette[0];"));
        assert!(code.contains("class RF__Inner {"));
        assert!(code.find("RF__Outer").unwrap() < code.find("RF__Inner").unwrap());

        let strict = HarnessGenerator::new(HarnessOptions {
            eligibility: EligibilityPolicy::DirectMembers,
            ..HarnessOptions::default()
        });
        let code = strict.generate(&u);
        assert!(!code.contains("RF__Outer"));
        assert!(code.contains("class RF__Inner {"));
    }

    #[test]
    fn test_blocks_are_contiguous_and_complete() {
        let u = unit(vec![
            class("A").with_member(method("a", Access::Public)),
            class("B").with_member(method("b", Access::Public)),
        ]);

        let gen = HarnessGenerator::default();
        let blocks: Vec<String> = gen.blocks(&u).collect();
        assert_eq!(blocks.len(), 2);
        for block in &blocks {
            assert!(block.starts_with("namespace ramfuzz {\n"));
            assert!(block.ends_with("} // namespace ramfuzz\n"));
        }
        assert_eq!(gen.generate(&u), blocks.concat());
    }

    #[test]
    fn test_empty_unit_generates_nothing() {
        assert_eq!(HarnessGenerator::default().generate(&unit(vec![])), "");
    }
}
