// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path resolution against a snapshot.
//!
//! A dotted path resolves to exactly one of three outcomes: a leaf value, an
//! internal node with children, or absent. Sources may disagree on whether a
//! path is a leaf or a subtree; the documented policy is leaf-wins: if the
//! merged view has a value at the exact path, the path resolves as a leaf
//! even when some source also exposes children there.

use crate::domain::{ConfigValue, Key, Result};
use crate::service::snapshot::Snapshot;

/// The outcome of resolving a path against a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The path resolves directly to a value.
    Leaf(ConfigValue),
    /// The path is an internal node with the given child names.
    Internal(Vec<String>),
    /// No source defines the path or anything under it.
    Absent,
}

impl Resolution {
    /// Returns `true` unless the path is absent.
    pub fn exists(&self) -> bool {
        !matches!(self, Resolution::Absent)
    }
}

/// Resolves a path, applying the leaf-wins policy.
pub fn resolve(snapshot: &Snapshot, key: &Key) -> Result<Resolution> {
    if let Some(value) = snapshot.value_at(key.as_str())? {
        return Ok(Resolution::Leaf(value));
    }
    let children = snapshot.children_of(key);
    if children.is_empty() {
        Ok(Resolution::Absent)
    } else {
        Ok(Resolution::Internal(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MapSource;
    use crate::service::registry::SourceRegistry;
    use std::sync::Arc;

    fn snapshot(sources: Vec<(MapSource, i32)>) -> Snapshot {
        let mut registry = SourceRegistry::new();
        for (source, ordinal) in sources {
            registry.register(Arc::new(source), Some(ordinal)).unwrap();
        }
        Snapshot::from_registry(&registry)
    }

    #[test]
    fn test_resolve_leaf() {
        let snap = snapshot(vec![(MapSource::new("a").with_entry("k", "v"), 100)]);
        match resolve(&snap, &Key::from("k")).unwrap() {
            Resolution::Leaf(value) => assert_eq!(value.value(), "v"),
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_internal() {
        let snap = snapshot(vec![(
            MapSource::new("a")
                .with_entry("group.one", "1")
                .with_entry("group.two", "2"),
            100,
        )]);
        match resolve(&snap, &Key::from("group")).unwrap() {
            Resolution::Internal(children) => assert_eq!(children, vec!["one", "two"]),
            other => panic!("expected internal, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_absent() {
        let snap = snapshot(vec![(MapSource::new("a"), 100)]);
        assert_eq!(resolve(&snap, &Key::from("nope")).unwrap(), Resolution::Absent);
        assert!(!Resolution::Absent.exists());
    }

    #[test]
    fn test_leaf_wins_over_children() {
        // one source has a value at "node", another has children under it
        let snap = snapshot(vec![
            (MapSource::new("leafy").with_entry("node", "value"), 50),
            (MapSource::new("treey").with_entry("node.child", "c"), 100),
        ]);
        match resolve(&snap, &Key::from("node")).unwrap() {
            Resolution::Leaf(value) => assert_eq!(value.value(), "value"),
            other => panic!("expected leaf-wins, got {other:?}"),
        }
    }
}
