//! Which classes and members get harness code.

use ramfuzz_decl::{Access, ClassDecl, MemberDecl, MemberKind, Provenance, ScopeKind};
use serde::{Deserialize, Serialize};

/// How strictly a class must expose public member functions to qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EligibilityPolicy {
    /// A public member function anywhere below the class (nested classes,
    /// nested class templates and member templates included) is enough. Such a class may still end up
    /// with no stubs.
    #[default]
    Subtree,
    /// The class itself must declare at least one member that gets a stub.
    DirectMembers,
}

/// Whether a class gets a harness block at all.
pub fn class_qualifies(class: &ClassDecl, policy: EligibilityPolicy) -> bool {
    if class.provenance != Provenance::MainFile || class.scope == ScopeKind::Anonymous {
        return false;
    }
    match policy {
        EligibilityPolicy::Subtree => class.has_public_method_in_subtree(),
        EligibilityPolicy::DirectMembers => class.members.iter().any(member_eligible),
    }
}

/// Whether a member of a qualifying class gets a stub: public, non-static,
/// and not a destructor.
pub fn member_eligible(member: &MemberDecl) -> bool {
    member.kind != MemberKind::Destructor && member.access == Access::Public && !member.is_static
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{class, ctor, dtor, method};

    #[test]
    fn test_member_rules() {
        assert!(member_eligible(&method("spin", Access::Public)));
        assert!(member_eligible(&ctor("Widget", Access::Public)));
        assert!(!member_eligible(&method("hidden", Access::Private)));
        assert!(!member_eligible(&method("guarded", Access::Protected)));
        assert!(!member_eligible(&dtor("~Widget", Access::Public)));
        assert!(!member_eligible(&method("make", Access::Public).with_static(true)));
    }

    #[test]
    fn test_private_ctor_and_protected_methods_do_not_qualify() {
        let c = class("Locked")
            .with_member(ctor("Locked", Access::Private))
            .with_member(method("step", Access::Protected));

        assert!(!class_qualifies(&c, EligibilityPolicy::Subtree));
        assert!(!class_qualifies(&c, EligibilityPolicy::DirectMembers));
    }

    #[test]
    fn test_anonymous_and_included_classes_are_excluded() {
        let base = class("A").with_member(method("f", Access::Public));
        assert!(class_qualifies(&base, EligibilityPolicy::Subtree));

        let hidden = base.clone().with_scope(ScopeKind::Anonymous);
        assert!(!class_qualifies(&hidden, EligibilityPolicy::Subtree));

        let included = base.with_provenance(Provenance::Included);
        assert!(!class_qualifies(&included, EligibilityPolicy::Subtree));
    }

    #[test]
    fn test_policies_differ_on_nested_only_classes() {
        let outer = class("Outer")
            .with_member(method("secret", Access::Private))
            .with_nested(class("Outer::Inner").with_member(method("poke", Access::Public)));

        assert!(class_qualifies(&outer, EligibilityPolicy::Subtree));
        assert!(!class_qualifies(&outer, EligibilityPolicy::DirectMembers));
    }

    #[test]
    fn test_nested_template_methods_qualify_under_subtree() {
        let outer = class("Outer")
            .with_subtree_only(class("Outer::Node").with_member(method("visit", Access::Public)));

        assert!(class_qualifies(&outer, EligibilityPolicy::Subtree));
        assert!(!class_qualifies(&outer, EligibilityPolicy::DirectMembers));
    }

    #[test]
    fn test_public_static_or_destructor_counts_for_subtree_only() {
        let c = class("Util")
            .with_member(method("helper", Access::Public).with_static(true))
            .with_member(dtor("~Util", Access::Public));

        assert!(class_qualifies(&c, EligibilityPolicy::Subtree));
        assert!(!class_qualifies(&c, EligibilityPolicy::DirectMembers));
    }

    #[test]
    fn test_policy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: EligibilityPolicy,
        }
        let direct: Wrapper = serde_json::from_str(r#"{"policy": "direct-members"}"#).unwrap();
        assert_eq!(direct.policy, EligibilityPolicy::DirectMembers);
        let subtree: Wrapper = serde_json::from_str(r#"{"policy": "subtree"}"#).unwrap();
        assert_eq!(subtree.policy, EligibilityPolicy::Subtree);
    }
}
