//! Attribute maps for building-like actors: named values with per-key
//! dirty flags, supporting partial (dirty-only) and full snapshots.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Text value.
    Text(String),
}

/// Mapping from attribute name to value. A key becomes dirty when its
/// value actually changes and stays dirty until flushed via
/// [`dirty_snapshot`](AttributeMap::dirty_snapshot).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeMap {
    values: FxHashMap<String, AttributeValue>,
    dirty: FxHashSet<String>,
}

impl AttributeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute. The key is marked dirty only if the stored value
    /// actually changed, so repeated identical writes stay silent.
    pub fn set(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        if self.values.get(&name) == Some(&value) {
            return;
        }
        self.values.insert(name.clone(), value);
        self.dirty.insert(name);
    }

    /// Looks up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// Returns `true` if any key is awaiting a flush.
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Returns the dirty entries sorted by name and clears their flags.
    pub fn dirty_snapshot(&mut self) -> Vec<(String, AttributeValue)> {
        let mut names: Vec<String> = self.dirty.drain().collect();
        names.sort_unstable();
        names
            .into_iter()
            .filter_map(|n| self.values.get(&n).map(|v| (n.clone(), v.clone())))
            .collect()
    }

    /// Returns every entry sorted by name. Dirty flags are untouched.
    pub fn full_snapshot(&self) -> Vec<(String, AttributeValue)> {
        let mut entries: Vec<(String, AttributeValue)> = self
            .values
            .iter()
            .map(|(n, v)| (n.clone(), v.clone()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the map holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_snapshot_drains_flags() {
        let mut attrs = AttributeMap::new();
        attrs.set("hp", AttributeValue::Int(100));
        attrs.set("label", AttributeValue::Text("chest".into()));
        assert!(attrs.has_dirty());

        let dirty = attrs.dirty_snapshot();
        assert_eq!(dirty.len(), 2);
        assert_eq!(dirty[0].0, "hp");
        assert!(!attrs.has_dirty());
        assert!(attrs.dirty_snapshot().is_empty());
    }

    #[test]
    fn test_identical_write_does_not_mark_dirty() {
        let mut attrs = AttributeMap::new();
        attrs.set("hp", AttributeValue::Int(100));
        attrs.dirty_snapshot();

        attrs.set("hp", AttributeValue::Int(100));
        assert!(!attrs.has_dirty());

        attrs.set("hp", AttributeValue::Int(90));
        assert!(attrs.has_dirty());
    }

    #[test]
    fn test_full_snapshot_keeps_flags() {
        let mut attrs = AttributeMap::new();
        attrs.set("b", AttributeValue::Bool(true));
        attrs.set("a", AttributeValue::Float(0.5));

        let full = attrs.full_snapshot();
        assert_eq!(full[0].0, "a");
        assert_eq!(full[1].0, "b");
        // Flags survive a full snapshot.
        assert!(attrs.has_dirty());
    }
}
