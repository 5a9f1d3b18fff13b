//! Retention policy: rules plus protected tags.

use crate::plan::{plan_group, GroupPlan, ImageGroup};
use crate::protection::ProtectedTags;
use crate::rule::{Rule, RuleSet};

/// Ordered rules and protected tags, applied to image groups.
#[derive(Debug, Clone, Default)]
pub struct RetentionPolicy {
    rules: RuleSet,
    protected: ProtectedTags,
}

impl RetentionPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(rules: RuleSet, protected: ProtectedTags) -> Self {
        Self { rules, protected }
    }

    /// Ordered rules.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Protected tags.
    #[must_use]
    pub const fn protected(&self) -> &ProtectedTags {
        &self.protected
    }

    /// Plans one image group.
    ///
    /// Returns `None` when no rule matches the image name; such groups are
    /// left untouched.
    #[must_use]
    pub fn evaluate(&self, group: ImageGroup) -> Option<(&Rule, GroupPlan)> {
        let rule = self.rules.first_match(&group.name)?;
        Some((rule, plan_group(group.components, rule.keep(), &self.protected)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::fixtures::component;

    fn policy() -> RetentionPolicy {
        RetentionPolicy::new(
            RuleSet::new(vec![
                Rule::new("prod", "^prod-.*", 2).unwrap(),
                Rule::new("everything", ".*", 1).unwrap(),
            ]),
            ProtectedTags::from_iter(["latest"]),
        )
    }

    #[test]
    fn test_evaluate_uses_first_matching_rule() {
        let group = ImageGroup {
            name: "prod-app".to_string(),
            components: vec![
                component("prod-app", "v1", 3),
                component("prod-app", "v2", 2),
                component("prod-app", "v3", 1),
            ],
        };
        let policy = policy();
        let (rule, plan) = policy.evaluate(group).unwrap();
        assert_eq!(rule.name(), "prod");
        assert_eq!(plan.keep.len(), 2);
        assert_eq!(plan.delete.len(), 1);
    }

    #[test]
    fn test_evaluate_unmatched_group() {
        let policy = RetentionPolicy::new(
            RuleSet::new(vec![Rule::new("prod", "^prod-.*", 2).unwrap()]),
            ProtectedTags::new(),
        );
        let group = ImageGroup {
            name: "unmatched-svc".to_string(),
            components: vec![component("unmatched-svc", "v1", 1)],
        };
        assert!(policy.evaluate(group).is_none());
    }
}
