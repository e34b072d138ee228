//! Tag and tag-group derivation from endpoint paths.
//!
//! Every endpoint gets a flat tag (the last path segment after the `api` prefix) and the
//! segments before it become nested groups. Groups are kept in an arena of nodes addressed
//! by index; the serialized form is the `x-tagGroups` vendor extension.

use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Tag used when a URI has no segments left after prefix removal
pub const GENERAL_TAG: &str = "general";

/// Tag and enclosing group path of a single URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub tag: String,
    pub group_path: Vec<String>,
}

/// Split a URI into its tag and group path.
///
/// `api/dashboard/admin/profile` yields tag `profile` under groups `dashboard` > `admin`.
pub fn classify(uri: &str) -> Classification {
    let mut segments: Vec<&str> = uri.split('/').filter(|s| !s.is_empty()).collect();
    if segments.first() == Some(&"api") {
        segments.remove(0);
    }

    match segments.split_last() {
        Some((tag, groups)) => Classification {
            tag: tag.to_string(),
            group_path: groups.iter().map(|s| s.to_string()).collect(),
        },
        None => Classification {
            tag: GENERAL_TAG.to_string(),
            group_path: Vec::new(),
        },
    }
}

/// Deduplicate and order tags alphabetically, with `general` always last
pub fn sort_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let unique: IndexSet<String> = tags.into_iter().map(Into::into).collect();
    let mut sorted: Vec<String> = unique.into_iter().collect();
    sorted.sort_by(|a, b| match (a == GENERAL_TAG, b == GENERAL_TAG) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    });
    sorted
}

#[derive(Debug, Clone)]
enum Child {
    Node(usize),
    Tag(String),
}

#[derive(Debug, Clone)]
struct GroupNode {
    name: String,
    children: Vec<Child>,
}

/// Serialized tag-group tree: groups nest, tags are leaves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagGroupEntry {
    Group {
        name: String,
        children: Vec<TagGroupEntry>,
    },
    Tag(String),
}

/// Arena-backed group tree built by successive [`TagGroups::insert`] calls
#[derive(Debug, Clone)]
pub struct TagGroups {
    nodes: Vec<GroupNode>,
    placed: IndexSet<String>,
}

const ROOT: usize = 0;

impl TagGroups {
    pub fn new() -> Self {
        Self {
            nodes: vec![GroupNode {
                name: String::new(),
                children: Vec::new(),
            }],
            placed: IndexSet::new(),
        }
    }

    /// Attach `tag` below the node reached by walking `group_path`.
    ///
    /// A tag is placed only once; later insertions of the same tag are ignored.
    pub fn insert(&mut self, group_path: &[String], tag: &str) {
        if self.placed.contains(tag) {
            return;
        }

        let mut current = ROOT;
        for segment in group_path {
            current = self.child_group(current, segment);
        }

        debug!("Placing tag '{}' under {:?}", tag, group_path);
        self.nodes[current].children.push(Child::Tag(tag.to_string()));
        self.placed.insert(tag.to_string());
    }

    /// All tags placed so far, in first-seen order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.placed.iter().map(String::as_str)
    }

    /// Serialized forest: the children of the implicit root
    pub fn to_entries(&self) -> Vec<TagGroupEntry> {
        self.entries_of(ROOT)
    }

    /// Index of the named child group of `parent`, created if absent
    fn child_group(&mut self, parent: usize, name: &str) -> usize {
        let existing = self.nodes[parent].children.iter().find_map(|child| match child {
            Child::Node(idx) if self.nodes[*idx].name == name => Some(*idx),
            _ => None,
        });
        if let Some(idx) = existing {
            return idx;
        }

        let idx = self.nodes.len();
        self.nodes.push(GroupNode {
            name: name.to_string(),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(Child::Node(idx));
        idx
    }

    fn entries_of(&self, idx: usize) -> Vec<TagGroupEntry> {
        self.nodes[idx]
            .children
            .iter()
            .map(|child| match child {
                Child::Node(n) => TagGroupEntry::Group {
                    name: self.nodes[*n].name.clone(),
                    children: self.entries_of(*n),
                },
                Child::Tag(tag) => TagGroupEntry::Tag(tag.clone()),
            })
            .collect()
    }
}

impl Default for TagGroups {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_nested() {
        assert_eq!(
            classify("api/dashboard/admin/profile"),
            Classification {
                tag: "profile".to_string(),
                group_path: path(&["dashboard", "admin"]),
            }
        );
    }

    #[test]
    fn test_classify_single_segment_is_not_general() {
        let c = classify("/api/ping");
        assert_eq!(c.tag, "ping");
        assert!(c.group_path.is_empty());
    }

    #[test]
    fn test_classify_empty_is_general() {
        assert_eq!(classify("api").tag, GENERAL_TAG);
        assert_eq!(classify("/api/").tag, GENERAL_TAG);
        assert_eq!(classify("").tag, GENERAL_TAG);
    }

    #[test]
    fn test_classify_only_leading_api_dropped() {
        let c = classify("v1/api/users");
        assert_eq!(c.tag, "users");
        assert_eq!(c.group_path, path(&["v1", "api"]));
    }

    #[test]
    fn test_sort_tags_general_last() {
        assert_eq!(
            sort_tags(["zeta", "general", "alpha"]),
            vec!["alpha", "zeta", "general"]
        );
        assert_eq!(sort_tags(["b", "a", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn test_tree_reuses_groups_and_places_tags_once() {
        let mut groups = TagGroups::new();
        groups.insert(&path(&["dashboard", "admin"]), "profile");
        groups.insert(&path(&["dashboard", "admin"]), "settings");
        groups.insert(&path(&["dashboard"]), "stats");
        groups.insert(&path(&["reports"]), "profile");
        groups.insert(&[], "ping");

        assert_eq!(
            serde_json::to_value(groups.to_entries()).unwrap(),
            json!([
                {
                    "name": "dashboard",
                    "children": [
                        {"name": "admin", "children": ["profile", "settings"]},
                        "stats"
                    ]
                },
                "ping"
            ])
        );
        assert_eq!(
            groups.tags().collect::<Vec<_>>(),
            vec!["profile", "settings", "stats", "ping"]
        );
    }
}
