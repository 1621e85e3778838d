//! Move extenders: given a low-level move the generator proposed,
//! additionally propose a *coarser* move that achieves a related effect by
//! touching a bigger subtree in one step.
//!
//! Extenders exist because a single-leaf move is sometimes exactly the
//! thing a validator rejects, while the coarser move it extends to is
//! valid — e.g. a table that has no schema can't be edited field-by-field
//! ([`crate::validators::FullConfigMoveValidator`] would reject every
//! partial state along the way) but can always be replaced wholesale.

use crate::diff::Diff;
use crate::json_move::{JsonMove, Op};
use crate::schema::SchemaOracle;

/// Proposes coarser candidate moves derived from an existing one.
pub trait MoveExtender {
    /// Returns zero or more additional moves derived from `mv`. An empty
    /// result means this extender has nothing to add for this move.
    fn extend(&self, mv: &JsonMove, diff: &Diff, oracle: &dyn SchemaOracle) -> Vec<JsonMove>;

    /// A short, stable name used in tracing output.
    fn name(&self) -> &'static str;
}

/// Coarsens a move one JSON Pointer level up: instead of touching a single
/// field, add/replace/remove its whole parent.
///
/// A move at the root has no upper level. A remove whose parent is the
/// root coarsens to removing the whole configuration, rather than
/// "replacing" a root that cannot itself be replaced piecewise.
#[derive(Debug, Default)]
pub struct UpperLevelMoveExtender;

impl MoveExtender for UpperLevelMoveExtender {
    fn extend(&self, mv: &JsonMove, diff: &Diff, _oracle: &dyn SchemaOracle) -> Vec<JsonMove> {
        let Some(parent) = mv.current_path().parent() else {
            return Vec::new();
        };
        if mv.op() == Op::Remove && parent.is_empty() {
            return vec![JsonMove::remove(parent)];
        }
        let in_current = parent.resolve(diff.current()).is_some();
        let in_target = parent.resolve(diff.target()).is_some();
        match (in_current, in_target) {
            (true, false) => vec![JsonMove::remove(parent)],
            (true, true) => vec![JsonMove::replace(parent.clone(), parent)],
            (false, _) => vec![JsonMove::add(parent.clone(), parent)],
        }
    }

    fn name(&self) -> &'static str {
        "upper_level"
    }
}

/// Coarsens a replace into a remove of the same path.
///
/// Useful when a field's type changes in a way that a plain `replace`
/// can't express consistently with the rest of the schema (e.g. a
/// create-only field): removing the row and re-adding it fresh sidesteps
/// the constraint a bare in-place replace would trip.
#[derive(Debug, Default)]
pub struct DeleteInsteadOfReplaceMoveExtender;

impl MoveExtender for DeleteInsteadOfReplaceMoveExtender {
    fn extend(&self, mv: &JsonMove, _diff: &Diff, _oracle: &dyn SchemaOracle) -> Vec<JsonMove> {
        if mv.op() == Op::Replace {
            vec![JsonMove::remove(mv.current_path().clone())]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "delete_instead_of_replace"
    }
}

/// For a remove move, also proposes removing everything that references the
/// path being removed, so a row can be deleted together with its referrers
/// in one pass rather than getting stuck on a dangling-reference validator.
#[derive(Debug, Default)]
pub struct DeleteRefsMoveExtender;

impl MoveExtender for DeleteRefsMoveExtender {
    fn extend(&self, mv: &JsonMove, diff: &Diff, oracle: &dyn SchemaOracle) -> Vec<JsonMove> {
        if mv.op() != Op::Remove {
            return Vec::new();
        }
        oracle
            .find_references(diff.current(), mv.current_path())
            .into_iter()
            .map(JsonMove::remove)
            .collect()
    }

    fn name(&self) -> &'static str {
        "delete_refs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Path, Token};
    use crate::schema::Catalog;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::builder()
            .table("PORT", |t| t.create_only("lanes"))
            .table("ACL_TABLE", |t| t.reference_list("ports", "PORT"))
            .build()
            .unwrap()
    }

    #[test]
    fn upper_level_coarsens_add_into_parent_add() {
        let diff = Diff::new(json!({}), json!({"PORT": {"Ethernet0": {"lanes": "65"}}}));
        let mv = JsonMove::add(Path::decode("/PORT/Ethernet0/lanes").unwrap(), Path::decode("/PORT/Ethernet0/lanes").unwrap());
        let extended = UpperLevelMoveExtender.extend(&mv, &diff, &catalog());
        assert_eq!(extended, vec![JsonMove::add(Path::decode("/PORT/Ethernet0").unwrap(), Path::decode("/PORT/Ethernet0").unwrap())]);
    }

    #[test]
    fn upper_level_remove_at_root_parent_removes_root() {
        let diff = Diff::new(json!({"PORT": {}}), json!({}));
        let mv = JsonMove::remove(Path::decode("/PORT").unwrap());
        let extended = UpperLevelMoveExtender.extend(&mv, &diff, &catalog());
        assert_eq!(extended, vec![JsonMove::remove(Path::root())]);
    }

    #[test]
    fn root_move_has_no_upper_level() {
        let diff = Diff::new(json!({}), json!({}));
        let mv = JsonMove::remove(Path::root());
        assert!(UpperLevelMoveExtender.extend(&mv, &diff, &catalog()).is_empty());
    }

    #[test]
    fn upper_level_coarsens_a_remove_into_a_remove_when_the_parent_vanishes_too() {
        // The parent exists in `current` but has no counterpart at all in
        // `target` (the whole table is being dropped), so coarsening must
        // propose removing it, not a `replace` with nowhere to read a value
        // from.
        let diff = Diff::new(json!({"PORT": {"Ethernet0": {"lanes": "65"}}}), json!({}));
        let mv = JsonMove::remove(Path::decode("/PORT/Ethernet0/lanes").unwrap());
        let extended = UpperLevelMoveExtender.extend(&mv, &diff, &catalog());
        assert_eq!(extended, vec![JsonMove::remove(Path::decode("/PORT/Ethernet0").unwrap())]);
    }

    #[test]
    fn delete_refs_proposes_removing_referrers() {
        let current = json!({
            "PORT": {"Ethernet0": {"lanes": "65"}},
            "ACL_TABLE": {"T1": {"ports": ["Ethernet0"]}},
        });
        let diff = Diff::new(current, json!({}));
        let mv = JsonMove::remove(Path::decode("/PORT/Ethernet0").unwrap());
        let extended = DeleteRefsMoveExtender.extend(&mv, &diff, &catalog());
        let expected = Path::decode("/ACL_TABLE/T1/ports").unwrap().child(Token::Index(0));
        assert_eq!(extended, vec![JsonMove::remove(expected)]);
    }
}
