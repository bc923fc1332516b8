// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable merged view of all sources at one point in time.
//!
//! A snapshot materializes every source into a layer and overlays the layers
//! in priority order: for any key the value comes from the highest-priority
//! source defining it. Snapshots are never modified; a source mutation
//! produces a successor snapshot via [`Snapshot::apply_change`], leaving
//! previously captured snapshots untouched.

use crate::domain::{ConfigError, ConfigValue, Key, Result};
use crate::ports::ChangeSet;
use crate::service::registry::SourceRegistry;
use std::collections::{BTreeMap, HashSet};

/// One materialized source.
#[derive(Clone)]
struct Layer {
    name: String,
    entries: BTreeMap<String, String>,
}

#[derive(Clone)]
struct Merged {
    value: String,
    source: String,
}

/// A point-in-time merged view of the registered sources.
///
/// All lookups on a snapshot are read-only and safe to call from any thread.
/// Placeholder expansion (`${other.key}`) happens during [`Snapshot::value_at`]
/// and resolves recursively against this same snapshot, guarded against
/// reference cycles.
pub struct Snapshot {
    /// Layers in priority order, highest first.
    layers: Vec<Layer>,
    /// Winning entry per key, derived from `layers`.
    merged: BTreeMap<String, Merged>,
}

impl Snapshot {
    /// Materializes every source in the registry into an immutable snapshot.
    pub(crate) fn from_registry(registry: &SourceRegistry) -> Self {
        let layers: Vec<Layer> = registry
            .handles()
            .iter()
            .map(|handle| {
                let source = handle.source();
                let entries: BTreeMap<String, String> = source
                    .keys()
                    .into_iter()
                    .filter_map(|key| source.value(&key).map(|value| (key, value)))
                    .collect();
                tracing::debug!(
                    source = %handle.name(),
                    keys = entries.len(),
                    "materialized configuration source"
                );
                Layer {
                    name: handle.name().to_string(),
                    entries,
                }
            })
            .collect();
        let merged = Self::merge(&layers);
        Snapshot { layers, merged }
    }

    /// Overlays layers, highest priority first; first definition wins.
    fn merge(layers: &[Layer]) -> BTreeMap<String, Merged> {
        let mut merged = BTreeMap::new();
        for layer in layers {
            for (key, value) in &layer.entries {
                merged.entry(key.clone()).or_insert_with(|| Merged {
                    value: value.clone(),
                    source: layer.name.clone(),
                });
            }
        }
        merged
    }

    /// Returns the raw (unexpanded) value and supplying source for a key.
    pub fn raw(&self, key: &str) -> Option<(&str, &str)> {
        self.merged
            .get(key)
            .map(|m| (m.value.as_str(), m.source.as_str()))
    }

    /// Resolves a leaf value, expanding `${other.key}` placeholders.
    ///
    /// Returns `Ok(None)` when no source defines the key. Fails with
    /// [`ConfigError::CircularReference`] when expansion loops. A placeholder
    /// referencing an undefined key is left in the output verbatim.
    pub fn value_at(&self, key: &str) -> Result<Option<ConfigValue>> {
        match self.merged.get(key) {
            Some(m) => {
                let mut stack = vec![key.to_string()];
                let value = self.expand(&m.value, &mut stack)?;
                Ok(Some(ConfigValue::new(
                    key,
                    value,
                    m.value.clone(),
                    m.source.clone(),
                )))
            }
            None => Ok(None),
        }
    }

    fn expand(&self, raw: &str, stack: &mut Vec<String>) -> Result<String> {
        if !raw.contains("${") {
            return Ok(raw.to_string());
        }
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let reference = &after[..end];
                    if stack.iter().any(|k| k == reference) {
                        let mut cycle = stack.clone();
                        cycle.push(reference.to_string());
                        let key = stack
                            .first()
                            .cloned()
                            .unwrap_or_else(|| reference.to_string());
                        return Err(ConfigError::CircularReference { key, cycle });
                    }
                    match self.merged.get(reference) {
                        Some(m) => {
                            stack.push(reference.to_string());
                            let expanded = self.expand(&m.value, stack)?;
                            stack.pop();
                            out.push_str(&expanded);
                        }
                        None => {
                            // unresolved reference stays literal
                            out.push_str("${");
                            out.push_str(reference);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    // unterminated placeholder, keep as-is
                    out.push_str(&rest[start..]);
                    rest = "";
                    break;
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Enumerates the direct child names under a prefix.
    ///
    /// The result is the deduplicated union across all layers, iterated in
    /// priority order and then key order within a layer, so it is
    /// deterministic for a given snapshot.
    pub fn children_of(&self, prefix: &Key) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut children = Vec::new();
        for layer in &self.layers {
            for key in layer.entries.keys() {
                if let Some(rest) = prefix.relative(key) {
                    if rest.is_empty() {
                        continue;
                    }
                    let segment = rest.split('.').next().unwrap_or(rest);
                    if seen.insert(segment.to_string()) {
                        children.push(segment.to_string());
                    }
                }
            }
        }
        children
    }

    /// Returns `true` if any key lies at or under the given prefix.
    pub fn contains(&self, prefix: &Key) -> bool {
        if self.merged.contains_key(prefix.as_str()) {
            return true;
        }
        self.merged.keys().any(|key| prefix.covers(key))
    }

    /// Bulk export of the subtree rooted at `prefix`.
    ///
    /// Maps every fully qualified key under the prefix (and the prefix itself
    /// if it is a leaf) to its expanded value. Callers should not assume the
    /// view reflects the very latest mutation; it is a view of this snapshot.
    pub fn properties_view(&self, prefix: &Key) -> Result<BTreeMap<String, String>> {
        let mut out = BTreeMap::new();
        for key in self.merged.keys() {
            if prefix.covers(key) {
                if let Some(value) = self.value_at(key)? {
                    out.insert(key.clone(), value.into_value());
                }
            }
        }
        Ok(out)
    }

    /// Builds the successor snapshot with one source's changes applied.
    ///
    /// The receiver is left untouched; configuration nodes captured against
    /// it keep observing the pre-mutation values.
    pub(crate) fn apply_change(&self, source_name: &str, changes: &ChangeSet) -> Snapshot {
        let mut layers = self.layers.clone();
        for layer in &mut layers {
            if layer.name == source_name {
                for (key, value) in changes {
                    match value {
                        Some(value) => {
                            layer.entries.insert(key.clone(), value.clone());
                        }
                        None => {
                            layer.entries.remove(key);
                        }
                    }
                }
            }
        }
        tracing::debug!(
            source = source_name,
            changed = changes.len(),
            "rebuilt snapshot after source mutation"
        );
        let merged = Self::merge(&layers);
        Snapshot { layers, merged }
    }
}
