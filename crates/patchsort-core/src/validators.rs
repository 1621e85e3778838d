//! Move validators: each one asks a single yes/no question about a
//! candidate move, in the context of the diff it would apply to. A move is
//! usable only once every validator accepts it; see [`crate::move_wrapper`].
//!
//! Validators simulate the move ([`Diff::apply_move`]) and inspect the
//! resulting state — they never mutate anything, and a `false` verdict
//! never raises an error. That's what lets the search backtrack cheaply:
//! a rejected move is just a dead branch, not a failure.

use std::collections::HashSet;

use serde_json::Value;

use crate::diff::Diff;
use crate::json_move::{JsonMove, Op};
use crate::path::{Path, Token};
use crate::schema::SchemaOracle;
use crate::SorterError;

/// Accepts or rejects a candidate move.
pub trait MoveValidator {
    /// Returns `Ok(true)` if `mv` may be applied to `diff`.
    ///
    /// # Errors
    /// Propagates failures from simulating the move (e.g. an internal
    /// invariant violation in a generator/extender), not validator
    /// rejections — those are `Ok(false)`.
    fn validate(&self, mv: &JsonMove, diff: &Diff, oracle: &dyn SchemaOracle) -> Result<bool, SorterError>;

    /// A short, stable name used in tracing output.
    fn name(&self) -> &'static str;
}

/// Rejects removing the entire configuration in one step. The root may
/// only ever be replaced (itself never proposed) or narrowed down to
/// nothing through per-table removes.
#[derive(Debug, Default)]
pub struct DeleteWholeConfigMoveValidator;

impl MoveValidator for DeleteWholeConfigMoveValidator {
    fn validate(&self, mv: &JsonMove, _diff: &Diff, _oracle: &dyn SchemaOracle) -> Result<bool, SorterError> {
        Ok(!(mv.op() == Op::Remove && mv.current_path().is_empty()))
    }

    fn name(&self) -> &'static str {
        "delete_whole_config"
    }
}

/// Rejects moves that would leave a `PORT` row's `lanes` field claiming a
/// lane number that some other `PORT` row also claims.
///
/// This is deliberately concrete rather than schema-driven: it exists to
/// demonstrate, in this crate's own test suite, the kind of bespoke
/// cross-row invariant a real deployment plugs in alongside the oracle.
#[derive(Debug, Default)]
pub struct UniqueLanesMoveValidator;

impl MoveValidator for UniqueLanesMoveValidator {
    fn validate(&self, mv: &JsonMove, diff: &Diff, _oracle: &dyn SchemaOracle) -> Result<bool, SorterError> {
        let post = diff.apply_move(mv)?;
        let Some(ports) = post.current().get("PORT").and_then(|v| v.as_object()) else {
            return Ok(true);
        };
        let mut seen = std::collections::HashSet::new();
        for row in ports.values() {
            let Some(lanes) = row.get("lanes").and_then(|v| v.as_str()) else { continue };
            for lane in lanes.split(',') {
                let Ok(lane) = lane.trim().parse::<u32>() else { continue };
                if !seen.insert(lane) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "unique_lanes"
    }
}

/// Rejects moves that change the value of a create-only field on a row that
/// is present on both sides of the move, no matter how coarse the move is:
/// a whole-row or whole-table replace that happens to carry a different
/// value for a create-only field is rejected exactly the same as a replace
/// aimed straight at that field. Create-only fields may still be set when
/// the row itself is created, and vanish when the row is removed.
#[derive(Debug, Default)]
pub struct CreateOnlyMoveValidator;

/// For every create-only field the schema declares, on every row present in
/// either `current` or `post`, the value must be equal wherever the field is
/// present on both sides — appearing/disappearing together with its row is
/// fine, changing in place while the row survives is not.
fn create_only_fields_unchanged(current: &Value, post: &Value, oracle: &dyn SchemaOracle) -> bool {
    let Some(cur_root) = current.as_object() else { return true };
    let Some(post_root) = post.as_object() else { return true };
    let tables: HashSet<&String> = cur_root.keys().chain(post_root.keys()).collect();

    for table in tables {
        let cur_rows = cur_root.get(table).and_then(Value::as_object);
        let post_rows = post_root.get(table).and_then(Value::as_object);
        let row_keys: HashSet<&String> =
            cur_rows.into_iter().flatten().chain(post_rows.into_iter().flatten()).map(|(k, _)| k).collect();

        for row_key in row_keys {
            let cur_row = cur_rows.and_then(|rows| rows.get(row_key)).and_then(Value::as_object);
            let post_row = post_rows.and_then(|rows| rows.get(row_key)).and_then(Value::as_object);
            let field_keys: HashSet<&String> =
                cur_row.into_iter().flatten().chain(post_row.into_iter().flatten()).map(|(k, _)| k).collect();

            for field_key in field_keys {
                let path = Path::from_tokens(vec![
                    Token::Key(table.clone()),
                    Token::Key(row_key.clone()),
                    Token::Key(field_key.clone()),
                ]);
                if !oracle.is_create_only(&path) {
                    continue;
                }
                let cur_value = cur_row.and_then(|row| row.get(field_key));
                let post_value = post_row.and_then(|row| row.get(field_key));
                if let (Some(a), Some(b)) = (cur_value, post_value) {
                    if a != b {
                        return false;
                    }
                }
            }
        }
    }
    true
}

impl MoveValidator for CreateOnlyMoveValidator {
    fn validate(&self, mv: &JsonMove, diff: &Diff, oracle: &dyn SchemaOracle) -> Result<bool, SorterError> {
        let post = diff.apply_move(mv)?;
        Ok(create_only_fields_unchanged(diff.current(), post.current(), oracle))
    }

    fn name(&self) -> &'static str {
        "create_only"
    }
}

/// Rejects moves that, once applied, leave a reference dangling or create
/// a reference to something that does not exist yet.
#[derive(Debug, Default)]
pub struct NoDependencyMoveValidator;

impl NoDependencyMoveValidator {
    fn check_remove(diff: &Diff, path: &Path, oracle: &dyn SchemaOracle) -> bool {
        oracle.find_references(diff.current(), path).iter().all(|referrer| path.is_prefix_of(referrer))
    }

    fn check_add(post: &Diff, path: &Path, oracle: &dyn SchemaOracle) -> bool {
        oracle.dependencies(post.current(), path).iter().all(|dep| dep.resolve(post.current()).is_some())
    }
}

impl MoveValidator for NoDependencyMoveValidator {
    fn validate(&self, mv: &JsonMove, diff: &Diff, oracle: &dyn SchemaOracle) -> Result<bool, SorterError> {
        match mv.op() {
            Op::Remove => Ok(Self::check_remove(diff, mv.current_path(), oracle)),
            Op::Add => {
                let post = diff.apply_move(mv)?;
                Ok(Self::check_add(&post, mv.current_path(), oracle))
            }
            Op::Replace => {
                let post = diff.apply_move(mv)?;
                let removed_ok = Self::check_remove(diff, mv.current_path(), oracle);
                let added_ok = Self::check_add(&post, mv.current_path(), oracle);
                Ok(removed_ok && added_ok)
            }
        }
    }

    fn name(&self) -> &'static str {
        "no_dependency"
    }
}

/// Rejects moves that leave a known table present but empty. An empty
/// table is, for most schemas, indistinguishable from an absent one and
/// rejected by the underlying system — so the sorter treats "drop the last
/// row" and "drop the table" as the same event.
#[derive(Debug, Default)]
pub struct NoEmptyTableMoveValidator;

impl MoveValidator for NoEmptyTableMoveValidator {
    fn validate(&self, mv: &JsonMove, diff: &Diff, _oracle: &dyn SchemaOracle) -> Result<bool, SorterError> {
        let post = diff.apply_move(mv)?;
        let Some(root) = post.current().as_object() else { return Ok(true) };
        Ok(root.values().all(|table| !table.as_object().is_some_and(|rows| rows.is_empty())))
    }

    fn name(&self) -> &'static str {
        "no_empty_table"
    }
}

/// Rejects moves whose resulting state fails full schema validation.
///
/// Intermediate states are allowed to be incomplete (a row missing a field
/// its neighbor supplies); they must still be internally consistent enough
/// for the oracle to accept as a whole.
#[derive(Debug, Default)]
pub struct FullConfigMoveValidator;

impl MoveValidator for FullConfigMoveValidator {
    fn validate(&self, mv: &JsonMove, diff: &Diff, oracle: &dyn SchemaOracle) -> Result<bool, SorterError> {
        let post = diff.apply_move(mv)?;
        Ok(oracle.validate_config(post.current()))
    }

    fn name(&self) -> &'static str {
        "full_config"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn rejects_removing_the_root() {
        let diff = Diff::new(json!({"a": 1}), json!({}));
        let mv = JsonMove::remove(Path::root());
        assert!(!DeleteWholeConfigMoveValidator.validate(&mv, &diff, &catalog()).unwrap());
    }

    #[test]
    fn rejects_duplicate_lanes() {
        let current = json!({"PORT": {"Ethernet0": {"lanes": "65"}}});
        let target = json!({"PORT": {"Ethernet0": {"lanes": "65"}, "Ethernet4": {"lanes": "65"}}});
        let diff = Diff::new(current, target);
        let mv = JsonMove::add(Path::decode("/PORT/Ethernet4").unwrap(), Path::decode("/PORT/Ethernet4").unwrap());
        assert!(!UniqueLanesMoveValidator.validate(&mv, &diff, &catalog()).unwrap());
    }

    #[test]
    fn create_only_rejects_in_place_edit_of_surviving_row() {
        let current = json!({"PORT": {"Ethernet0": {"lanes": "65"}}});
        let target = json!({"PORT": {"Ethernet0": {"lanes": "66"}}});
        let diff = Diff::new(current, target);
        let mv = JsonMove::replace(Path::decode("/PORT/Ethernet0/lanes").unwrap(), Path::decode("/PORT/Ethernet0/lanes").unwrap());
        assert!(!CreateOnlyMoveValidator.validate(&mv, &diff, &catalog()).unwrap());
    }

    #[test]
    fn create_only_allows_field_created_with_its_row() {
        let diff = Diff::new(json!({"PORT": {}}), json!({"PORT": {"Ethernet0": {"lanes": "65"}}}));
        let mv = JsonMove::add(Path::decode("/PORT/Ethernet0").unwrap(), Path::decode("/PORT/Ethernet0").unwrap());
        assert!(CreateOnlyMoveValidator.validate(&mv, &diff, &catalog()).unwrap());
    }

    #[test]
    fn create_only_rejects_a_row_level_replace_that_changes_lanes() {
        // A coarser move than a leaf replace: the row survives the move, but
        // its create-only `lanes` value still changes underneath it.
        let current = json!({"PORT": {"Ethernet0": {"lanes": "65"}}});
        let target = json!({"PORT": {"Ethernet0": {"lanes": "66"}}});
        let diff = Diff::new(current, target);
        let mv = JsonMove::replace(Path::decode("/PORT/Ethernet0").unwrap(), Path::decode("/PORT/Ethernet0").unwrap());
        assert!(!CreateOnlyMoveValidator.validate(&mv, &diff, &catalog()).unwrap());
    }

    #[test]
    fn create_only_rejects_a_table_level_replace_that_changes_lanes() {
        let current = json!({"PORT": {"Ethernet0": {"lanes": "65"}}});
        let target = json!({"PORT": {"Ethernet0": {"lanes": "66"}}});
        let diff = Diff::new(current, target);
        let mv = JsonMove::replace(Path::decode("/PORT").unwrap(), Path::decode("/PORT").unwrap());
        assert!(!CreateOnlyMoveValidator.validate(&mv, &diff, &catalog()).unwrap());
    }

    #[test]
    fn no_dependency_rejects_removing_a_referenced_row() {
        let current = json!({
            "PORT": {"Ethernet0": {"lanes": "65"}},
            "ACL_TABLE": {"T1": {"ports": ["Ethernet0"]}},
        });
        let diff = Diff::new(current, json!({"ACL_TABLE": {"T1": {"ports": ["Ethernet0"]}}}));
        let mv = JsonMove::remove(Path::decode("/PORT/Ethernet0").unwrap());
        assert!(!NoDependencyMoveValidator.validate(&mv, &diff, &catalog()).unwrap());
    }

    #[test]
    fn no_dependency_rejects_adding_a_dangling_reference() {
        let diff = Diff::new(json!({}), json!({"ACL_TABLE": {"T1": {"ports": ["Ethernet0"]}}}));
        let mv = JsonMove::add(Path::decode("/ACL_TABLE/T1").unwrap(), Path::decode("/ACL_TABLE/T1").unwrap());
        assert!(!NoDependencyMoveValidator.validate(&mv, &diff, &catalog()).unwrap());
    }

    #[test]
    fn rejects_leaving_a_table_empty() {
        let diff = Diff::new(json!({"PORT": {"Ethernet0": {}}}), json!({"PORT": {}}));
        let mv = JsonMove::remove(Path::decode("/PORT/Ethernet0").unwrap());
        assert!(!NoEmptyTableMoveValidator.validate(&mv, &diff, &catalog()).unwrap());
    }
}
