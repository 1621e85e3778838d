//! The search-space node: a pair of JSON values representing "how far we've
//! gotten" (`current`) and "where we need to end up" (`target`).

use serde_json::Value;

use crate::hash::{combine_ordered, hash_value, HashCode};
use crate::json_move::JsonMove;
use crate::SorterError;

/// A node in the state-space search: a snapshot of `current` paired with
/// the immutable `target` it is converging toward.
///
/// Two `Diff`s with the same `current` and `target` are the same search
/// node regardless of how they were reached, which is what makes
/// memoization (see [`crate::algorithm`]) sound.
#[derive(Clone, Debug, PartialEq)]
pub struct Diff {
    current: Value,
    target: Value,
}

impl Diff {
    /// Creates a new diff node.
    #[must_use]
    pub fn new(current: Value, target: Value) -> Self {
        Self { current, target }
    }

    /// The configuration reached so far.
    #[must_use]
    pub fn current(&self) -> &Value {
        &self.current
    }

    /// The configuration the search is converging toward. Never mutated.
    #[must_use]
    pub fn target(&self) -> &Value {
        &self.target
    }

    /// `true` once `current` and `target` are structurally identical — the
    /// search's goal state.
    #[must_use]
    pub fn is_goal(&self) -> bool {
        self.current == self.target
    }

    /// Applies `mv` to `current`, returning the successor node.
    ///
    /// This is the search's only state transition: a [`JsonMove`] compiles
    /// to exactly one `json-patch` operation, applied against `current`
    /// while `target` is carried over unchanged.
    pub fn apply_move(&self, mv: &JsonMove) -> Result<Diff, SorterError> {
        let op = mv.compile(self)?;
        let mut next_current = self.current.clone();
        json_patch::patch(&mut next_current, &json_patch::Patch(vec![op]))?;
        Ok(Diff { current: next_current, target: self.target.clone() })
    }

    /// A structural hash of this node, combined asymmetrically so that
    /// swapping `current` and `target` never collides with the original.
    /// Used as the memoization key in [`crate::algorithm::MemoizationSearch`].
    #[must_use]
    pub fn hash_code(&self) -> HashCode {
        combine_ordered(hash_value(&self.current), hash_value(&self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn goal_detection_is_structural() {
        let diff = Diff::new(json!({"a": 1}), json!({"a": 1}));
        assert!(diff.is_goal());
    }

    #[test]
    fn hash_is_asymmetric() {
        let forward = Diff::new(json!({"a": 1}), json!({"a": 2}));
        let backward = Diff::new(json!({"a": 2}), json!({"a": 1}));
        assert_ne!(forward.hash_code(), backward.hash_code());
    }

    #[test]
    fn hash_is_stable_for_equal_diffs() {
        let a = Diff::new(json!({"a": 1, "b": 2}), json!({"a": 2}));
        let b = Diff::new(json!({"b": 2, "a": 1}), json!({"a": 2}));
        assert_eq!(a.hash_code(), b.hash_code());
    }
}
