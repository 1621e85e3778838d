//! Turns a [`Diff`] into the set of atomic moves that could plausibly
//! narrow the gap between `current` and `target`.
//!
//! The generator over-generates on purpose (see the module-level docs on
//! [`crate::validators`] and [`crate::extenders`]): at a diverging array
//! position it emits remove, add *and* replace candidates rather than
//! trying to guess which one is "right". Picking the minimal edit sequence
//! is explicitly not this crate's job.

use serde_json::Value;

use crate::diff::Diff;
use crate::json_move::JsonMove;
use crate::path::{Path, Token};

/// Generates every low-level (single-leaf) move implied by the current gap
/// between `diff.current()` and `diff.target()`.
#[must_use]
pub fn low_level_moves(diff: &Diff) -> Vec<JsonMove> {
    let mut out = Vec::new();
    walk(diff.current(), diff.target(), &Path::root(), &mut out);
    out
}

fn walk(current: &Value, target: &Value, path: &Path, out: &mut Vec<JsonMove>) {
    if current == target {
        return;
    }
    match (current, target) {
        (Value::Object(c), Value::Object(t)) => {
            for (key, tval) in t {
                let child = path.child(Token::Key(key.clone()));
                match c.get(key) {
                    Some(cval) => walk(cval, tval, &child, out),
                    None => emit_missing(tval, &child, out),
                }
            }
            for (key, cval) in c {
                if !t.contains_key(key) {
                    emit_extra(cval, &path.child(Token::Key(key.clone())), out);
                }
            }
        }
        (Value::Array(c), Value::Array(t)) => array_walk(c, t, path, out),
        _ => out.push(JsonMove::replace(path.clone(), path.clone())),
    }
}

/// `value` exists in `target` but has no counterpart in `current` at `path`.
/// Recurses through objects so a whole new table or row yields one `add`
/// per leaf field rather than a single coarse add for the row.
fn emit_missing(value: &Value, path: &Path, out: &mut Vec<JsonMove>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, v) in map {
                emit_missing(v, &path.child(Token::Key(key.clone())), out);
            }
        }
        _ => out.push(JsonMove::add(path.clone(), path.clone())),
    }
}

/// The dual of [`emit_missing`]: `value` exists in `current` but has no
/// counterpart in `target`.
fn emit_extra(value: &Value, path: &Path, out: &mut Vec<JsonMove>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, v) in map {
                emit_extra(v, &path.child(Token::Key(key.clone())), out);
            }
        }
        _ => out.push(JsonMove::remove(path.clone())),
    }
}

fn array_walk(current: &[Value], target: &[Value], path: &Path, out: &mut Vec<JsonMove>) {
    let max_len = current.len().max(target.len());
    for i in 0..max_len {
        let child = path.child(Token::Index(i));
        match (current.get(i), target.get(i)) {
            (Some(c), Some(t)) if c == t => {}
            (Some(_), Some(_)) => {
                // Divergent position: we cannot tell from the arrays alone
                // whether this is an in-place edit, a deletion that shifts
                // everything after it left, or an insertion that shifts
                // everything right. Offer all three and let validation (and
                // the search itself) sort out which one is coherent.
                out.push(JsonMove::remove(child.clone()));
                out.push(JsonMove::add(child.clone(), child.clone()));
                out.push(JsonMove::replace(child.clone(), child));
            }
            (Some(_), None) => out.push(JsonMove::remove(child)),
            (None, Some(_)) => out.push(JsonMove::add(child.clone(), child)),
            (None, None) => unreachable!("i < max_len implies at least one side has an element"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_move::Op;
    use serde_json::json;

    #[test]
    fn new_table_yields_one_add_per_leaf() {
        let diff = Diff::new(json!({}), json!({"PORT": {"Ethernet0": {"lanes": "65", "speed": "10000"}}}));
        let moves = low_level_moves(&diff);
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.op() == Op::Add));
        let paths: Vec<_> = moves.iter().map(|m| m.current_path().encode()).collect();
        assert!(paths.contains(&"/PORT/Ethernet0/lanes".to_string()));
        assert!(paths.contains(&"/PORT/Ethernet0/speed".to_string()));
    }

    #[test]
    fn removed_table_yields_one_remove_per_leaf() {
        let diff = Diff::new(json!({"PORT": {"Ethernet0": {"lanes": "65"}}}), json!({}));
        let moves = low_level_moves(&diff);
        assert_eq!(moves, vec![JsonMove::remove(Path::decode("/PORT/Ethernet0/lanes").unwrap())]);
    }

    #[test]
    fn unequal_leaf_yields_replace() {
        let diff = Diff::new(json!({"PORT": {"Ethernet0": {"lanes": "65"}}}), json!({"PORT": {"Ethernet0": {"lanes": "66"}}}));
        let moves = low_level_moves(&diff);
        assert_eq!(moves, vec![JsonMove::replace(Path::decode("/PORT/Ethernet0/lanes").unwrap(), Path::decode("/PORT/Ethernet0/lanes").unwrap())]);
    }

    #[test]
    fn identical_configs_yield_no_moves() {
        let diff = Diff::new(json!({"a": 1}), json!({"a": 1}));
        assert!(low_level_moves(&diff).is_empty());
    }

    #[test]
    fn diverging_array_position_yields_three_candidates() {
        let diff = Diff::new(json!({"list": ["a"]}), json!({"list": ["b"]}));
        let moves = low_level_moves(&diff);
        assert_eq!(moves.len(), 3);
    }
}
