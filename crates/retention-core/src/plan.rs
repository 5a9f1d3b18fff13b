//! Grouping and keep/delete planning for image tags.

use std::cmp::Reverse;
use std::collections::HashMap;

use retention_registry::Component;

use crate::protection::ProtectedTags;

/// All components of one image within a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGroup {
    /// Image name exactly as reported by the registry.
    pub name: String,
    /// Components in listing order.
    pub components: Vec<Component>,
}

/// Groups components by image name.
///
/// Groups appear in order of first appearance and keep listing order
/// internally, so the result is deterministic for a given listing.
#[must_use]
pub fn group_by_image(components: Vec<Component>) -> Vec<ImageGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ImageGroup> = Vec::new();

    for component in components {
        if let Some(&i) = index.get(&component.name) {
            groups[i].components.push(component);
        } else {
            index.insert(component.name.clone(), groups.len());
            groups.push(ImageGroup {
                name: component.name.clone(),
                components: vec![component],
            });
        }
    }

    groups
}

/// Sorts components most recently modified first.
///
/// The sort is stable: components with identical recency keep their listing
/// order.
pub fn sort_by_recency(components: &mut [Component]) {
    components.sort_by_key(|c| Reverse(c.last_modified()));
}

/// Keep/delete decision for one image group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPlan {
    /// Components carrying a protected tag, in listing order.
    pub protected: Vec<Component>,
    /// Most recent regular components, newest first.
    pub keep: Vec<Component>,
    /// Remaining regular components, newest first.
    pub delete: Vec<Component>,
}

impl GroupPlan {
    /// Total components kept (protected plus retained regular).
    #[must_use]
    pub fn kept_count(&self) -> usize {
        self.protected.len() + self.keep.len()
    }

    /// Iterates kept components: protected first, then regular newest first.
    pub fn kept(&self) -> impl Iterator<Item = &Component> {
        self.protected.iter().chain(self.keep.iter())
    }
}

/// Splits a group into protected, kept, and deleted components.
///
/// Protected components never count toward `keep`. Regular components are
/// sorted by recency; the newest `keep` are retained and the rest deleted.
#[must_use]
pub fn plan_group(components: Vec<Component>, keep: usize, protected: &ProtectedTags) -> GroupPlan {
    let (protected_components, mut regular): (Vec<_>, Vec<_>) = components
        .into_iter()
        .partition(|c| protected.contains(&c.version));

    sort_by_recency(&mut regular);
    let delete = if regular.len() > keep {
        regular.split_off(keep)
    } else {
        Vec::new()
    };

    GroupPlan {
        protected: protected_components,
        keep: regular,
        delete,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use retention_registry::{Asset, Component};

    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    pub fn asset(last_modified: DateTime<Utc>) -> Asset {
        Asset {
            download_url: String::new(),
            path: String::new(),
            id: String::new(),
            repository: "docker-hosted".to_string(),
            format: "docker".to_string(),
            last_modified: Some(last_modified),
        }
    }

    /// Component whose single asset was modified `age_hours` before the base time.
    pub fn component(name: &str, tag: &str, age_hours: i64) -> Component {
        component_with_assets(name, tag, vec![asset(base_time() - Duration::hours(age_hours))])
    }

    pub fn component_with_assets(name: &str, tag: &str, assets: Vec<Asset>) -> Component {
        Component {
            id: format!("{name}:{tag}"),
            repository: "docker-hosted".to_string(),
            format: "docker".to_string(),
            group: None,
            name: name.to_string(),
            version: tag.to_string(),
            assets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::Duration;

    fn tags(components: &[Component]) -> Vec<&str> {
        components.iter().map(|c| c.version.as_str()).collect()
    }

    #[test]
    fn test_group_by_image_first_appearance_order() {
        let groups = group_by_image(vec![
            component("web", "v1", 1),
            component("api", "v1", 1),
            component("web", "v2", 2),
            component("db", "v1", 1),
            component("api", "v2", 2),
        ]);

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["web", "api", "db"]);
        assert_eq!(tags(&groups[0].components), vec!["v1", "v2"]);
        assert_eq!(tags(&groups[1].components), vec!["v1", "v2"]);
    }

    #[test]
    fn test_group_key_is_not_normalized() {
        let groups = group_by_image(vec![component("App", "v1", 1), component("app", "v1", 1)]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_recency_uses_latest_asset() {
        let t = base_time();
        let a = component_with_assets(
            "app",
            "a",
            vec![asset(t - Duration::hours(3)), asset(t - Duration::hours(1))],
        );
        let b = component_with_assets("app", "b", vec![asset(t - Duration::hours(2))]);

        let mut components = vec![b, a];
        sort_by_recency(&mut components);
        assert_eq!(tags(&components), vec!["a", "b"]);
    }

    #[test]
    fn test_component_without_assets_sorts_last() {
        let mut components = vec![
            component_with_assets("app", "empty", Vec::new()),
            component("app", "old", 10_000),
        ];
        sort_by_recency(&mut components);
        assert_eq!(tags(&components), vec!["old", "empty"]);
    }

    #[test]
    fn test_ties_keep_listing_order() {
        let mut components = vec![
            component("app", "first", 5),
            component("app", "second", 5),
            component("app", "newest", 1),
            component("app", "third", 5),
        ];
        sort_by_recency(&mut components);
        assert_eq!(tags(&components), vec!["newest", "first", "second", "third"]);
    }

    #[test]
    fn test_plan_keeps_newest_and_protected() {
        let protected = ProtectedTags::from_iter(["latest"]);
        let plan = plan_group(
            vec![
                component("prod-app", "v1", 30),
                component("prod-app", "latest", 40),
                component("prod-app", "v3", 10),
                component("prod-app", "v2", 20),
            ],
            2,
            &protected,
        );

        assert_eq!(tags(&plan.protected), vec!["latest"]);
        assert_eq!(tags(&plan.keep), vec!["v3", "v2"]);
        assert_eq!(tags(&plan.delete), vec!["v1"]);
        assert_eq!(plan.kept_count(), 3);
    }

    #[test]
    fn test_plan_nothing_deleted_within_keep_count() {
        let plan = plan_group(
            vec![component("app", "v1", 2), component("app", "v2", 1)],
            2,
            &ProtectedTags::new(),
        );
        assert!(plan.delete.is_empty());
        assert_eq!(plan.kept_count(), 2);
    }

    #[test]
    fn test_protected_does_not_consume_keep_slots() {
        let protected = ProtectedTags::from_iter(["latest", "stable"]);
        let plan = plan_group(
            vec![
                component("app", "latest", 0),
                component("app", "stable", 0),
                component("app", "v2", 1),
                component("app", "v1", 2),
            ],
            1,
            &protected,
        );
        assert_eq!(tags(&plan.keep), vec!["v2"]);
        assert_eq!(tags(&plan.delete), vec!["v1"]);
        let kept: Vec<&str> = plan.kept().map(|c| c.version.as_str()).collect();
        assert_eq!(kept, vec!["latest", "stable", "v2"]);
    }

    #[test]
    fn test_only_protected_components() {
        let protected = ProtectedTags::from_iter(["latest"]);
        let plan = plan_group(vec![component("app", "latest", 100)], 1, &protected);
        assert_eq!(plan.kept_count(), 1);
        assert!(plan.keep.is_empty());
        assert!(plan.delete.is_empty());
    }
}
