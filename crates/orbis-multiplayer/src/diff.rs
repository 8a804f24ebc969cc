//! Exact symmetric set difference, the primitive behind every interest
//! update.

use std::hash::Hash;

use rustc_hash::FxHashSet;

/// The add/remove sets needed to transform an old interest set into a new
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDiff<T> {
    /// Members of the new set that were not in the old set.
    pub to_add: Vec<T>,
    /// Members of the old set that are not in the new set.
    pub to_remove: Vec<T>,
}

/// Computes the exact diff between `old` and `new`:
/// `to_add = new − old`, `to_remove = old − new`. Consequently
/// `to_add ∩ old = ∅`, `to_remove ⊆ old`, and
/// `(old − to_remove) ∪ to_add = new`.
pub fn set_diff<T: Eq + Hash + Clone>(old: &FxHashSet<T>, new: &FxHashSet<T>) -> SetDiff<T> {
    SetDiff {
        to_add: new.difference(old).cloned().collect(),
        to_remove: old.difference(new).cloned().collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
