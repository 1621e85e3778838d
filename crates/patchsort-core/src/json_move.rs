//! A `JsonMove` is one atomic candidate step: an add, remove or replace that,
//! once compiled against a particular [`Diff`], becomes a single
//! `json-patch` operation.

use json_patch::{AddOperation, PatchOperation, RemoveOperation, ReplaceOperation};
use serde_json::Value;

use crate::diff::Diff;
use crate::path::{Path, Token};
use crate::SorterError;

/// The three move flavors a generator, extender or validator ever deals with.
///
/// `move` and `copy` are not modeled: the search only ever needs to decide
/// *whether a field should exist and what it should contain*, and any
/// `move`/`copy` the caller's input patch expressed can always be expanded
/// into an equivalent add/remove pair before sorting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// Create a field that is absent in `current`.
    Add,
    /// Delete a field that is present in `current`.
    Remove,
    /// Overwrite a field present in both `current` and `target` but unequal.
    Replace,
}

/// One candidate state-space edge.
///
/// `current_tokens` always addresses the location within `current` the move
/// acts on. `target_tokens` addresses, within `target`, the value the move
/// should produce — `None` for [`Op::Remove`], which has no value to supply.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JsonMove {
    op: Op,
    current_tokens: Path,
    target_tokens: Option<Path>,
    /// Set only when this move was built from a single external patch
    /// operation via [`JsonMove::from_patch_operation`]: the operation
    /// already carried its own value, so `compile` must not look it up
    /// (and, in particular, must not re-run lifting) against a `Diff`.
    literal_value: Option<Value>,
}

impl JsonMove {
    /// An add move: `current_tokens` is absent from `current`,
    /// `target_tokens` is present in `target`.
    #[must_use]
    pub fn add(current_tokens: Path, target_tokens: Path) -> Self {
        Self { op: Op::Add, current_tokens, target_tokens: Some(target_tokens), literal_value: None }
    }

    /// A remove move: `current_tokens` is present in `current` and absent
    /// from `target`.
    #[must_use]
    pub fn remove(current_tokens: Path) -> Self {
        Self { op: Op::Remove, current_tokens, target_tokens: None, literal_value: None }
    }

    /// A replace move: `current_tokens` is present in `current`,
    /// `target_tokens` is present in `target`, and the two values differ.
    #[must_use]
    pub fn replace(current_tokens: Path, target_tokens: Path) -> Self {
        Self { op: Op::Replace, current_tokens, target_tokens: Some(target_tokens), literal_value: None }
    }

    /// Builds a move directly from a single raw `json-patch` operation,
    /// e.g. one already-validated step of a larger patch that is being
    /// re-examined in isolation. Fails if `patch` does not contain exactly
    /// one `add`, `remove` or `replace` operation.
    ///
    /// Tokens decoded this way are always [`Token::Key`] (see [`Path::decode`]):
    /// a raw pointer string alone cannot tell a key from an index.
    pub fn from_patch_operation(patch: &json_patch::Patch) -> Result<Self, SorterError> {
        let [op] = patch.0.as_slice() else {
            return Err(SorterError::InvalidInputPatch(format!(
                "expected exactly one operation, found {}",
                patch.0.len()
            )));
        };
        match op {
            PatchOperation::Add(AddOperation { path, value }) => {
                let tokens = Path::decode(path)?;
                Ok(Self {
                    op: Op::Add,
                    current_tokens: tokens.clone(),
                    target_tokens: Some(tokens),
                    literal_value: Some(value.clone()),
                })
            }
            PatchOperation::Remove(RemoveOperation { path }) => {
                Ok(Self { op: Op::Remove, current_tokens: Path::decode(path)?, target_tokens: None, literal_value: None })
            }
            PatchOperation::Replace(ReplaceOperation { path, value }) => {
                let tokens = Path::decode(path)?;
                Ok(Self {
                    op: Op::Replace,
                    current_tokens: tokens.clone(),
                    target_tokens: Some(tokens),
                    literal_value: Some(value.clone()),
                })
            }
            other => Err(SorterError::InvalidInputPatch(format!(
                "move/copy/test operations are not supported: {other:?}"
            ))),
        }
    }

    /// The move's flavor.
    #[must_use]
    pub fn op(&self) -> Op {
        self.op
    }

    /// The location within `current` this move acts on.
    #[must_use]
    pub fn current_path(&self) -> &Path {
        &self.current_tokens
    }

    /// The location within `target` this move draws its value from, if any.
    #[must_use]
    pub fn target_path(&self) -> Option<&Path> {
        self.target_tokens.as_ref()
    }

    /// Compiles this move into the single `json-patch` operation it
    /// represents against `diff`.
    ///
    /// For [`Op::Add`] whose immediate parent does not yet exist in
    /// `diff.current()`, the move is *lifted*: the emitted operation
    /// targets the deepest ancestor of `current_tokens` that does exist,
    /// with a synthesized subtree as its value that recreates the missing
    /// spine down to the target leaf. This is what lets a single move add
    /// an entire new table row (or table) in one step, the same way a
    /// hand-written patch would.
    pub fn compile(&self, diff: &Diff) -> Result<PatchOperation, SorterError> {
        match self.op {
            Op::Remove => Ok(PatchOperation::Remove(RemoveOperation { path: self.current_tokens.encode() })),
            Op::Replace => {
                let value = self.value(diff)?;
                Ok(PatchOperation::Replace(ReplaceOperation { path: self.current_tokens.encode(), value }))
            }
            Op::Add => {
                let value = self.value(diff)?;
                if self.literal_value.is_some() {
                    return Ok(PatchOperation::Add(AddOperation { path: self.current_tokens.encode(), value }));
                }
                self.compile_lifted_add(diff, value)
            }
        }
    }

    fn value(&self, diff: &Diff) -> Result<Value, SorterError> {
        if let Some(literal) = &self.literal_value {
            return Ok(literal.clone());
        }
        let target_tokens = self.target_tokens.as_ref().ok_or_else(|| {
            SorterError::InternalInvariant(format!("{:?} move has no target tokens", self.op))
        })?;
        target_tokens.resolve(diff.target()).cloned().ok_or_else(|| {
            SorterError::InternalInvariant(format!(
                "target path {target_tokens} does not resolve against target"
            ))
        })
    }

    fn compile_lifted_add(&self, diff: &Diff, leaf: Value) -> Result<PatchOperation, SorterError> {
        let toks = self.current_tokens.tokens();
        if toks.is_empty() {
            return Ok(PatchOperation::Add(AddOperation { path: self.current_tokens.encode(), value: leaf }));
        }
        // Walk up from the immediate parent until we find a prefix that
        // resolves against `current`; that prefix is where the `add`
        // actually lands.
        let mut existing_len = toks.len() - 1;
        loop {
            if self.current_tokens.prefix(existing_len).resolve(diff.current()).is_some() {
                break;
            }
            if existing_len == 0 {
                break;
            }
            existing_len -= 1;
        }
        if existing_len == toks.len() - 1 {
            return Ok(PatchOperation::Add(AddOperation { path: self.current_tokens.encode(), value: leaf }));
        }
        let add_path = self.current_tokens.prefix(existing_len + 1);
        let remaining = &toks[existing_len + 1..];
        let value = synthesize_spine(remaining, leaf);
        Ok(PatchOperation::Add(AddOperation { path: add_path.encode(), value }))
    }
}

fn synthesize_spine(remaining: &[Token], leaf: Value) -> Value {
    match remaining.split_first() {
        None => leaf,
        Some((Token::Key(_), rest)) => {
            let mut map = serde_json::Map::new();
            if let Some((Token::Key(key), _)) = remaining.split_first() {
                map.insert(key.clone(), synthesize_spine(rest, leaf));
            }
            Value::Object(map)
        }
        Some((Token::Index(_), rest)) => Value::Array(vec![synthesize_spine(rest, leaf)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_add_targets_existing_parent() {
        let diff = Diff::new(json!({"PORT": {}}), json!({"PORT": {"Ethernet0": {"lanes": "65"}}}));
        let mv = JsonMove::add(Path::decode("/PORT/Ethernet0").unwrap(), Path::decode("/PORT/Ethernet0").unwrap());
        let op = mv.compile(&diff).unwrap();
        match op {
            PatchOperation::Add(AddOperation { path, value }) => {
                assert_eq!(path, "/PORT/Ethernet0");
                assert_eq!(value, json!({"lanes": "65"}));
            }
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn lifted_add_synthesizes_the_missing_spine() {
        let diff = Diff::new(json!({}), json!({"PORT": {"Ethernet0": {"lanes": "65"}}}));
        let mv = JsonMove::add(
            Path::decode("/PORT/Ethernet0/lanes").unwrap(),
            Path::decode("/PORT/Ethernet0/lanes").unwrap(),
        );
        let op = mv.compile(&diff).unwrap();
        match op {
            PatchOperation::Add(AddOperation { path, value }) => {
                assert_eq!(path, "/PORT");
                assert_eq!(value, json!({"Ethernet0": {"lanes": "65"}}));
            }
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn remove_ignores_target() {
        let diff = Diff::new(json!({"PORT": {"Ethernet0": {}}}), json!({"PORT": {}}));
        let mv = JsonMove::remove(Path::decode("/PORT/Ethernet0").unwrap());
        assert_eq!(
            mv.compile(&diff).unwrap(),
            PatchOperation::Remove(RemoveOperation { path: "/PORT/Ethernet0".to_string() })
        );
    }

    #[test]
    fn from_patch_operation_rejects_multi_op_patches() {
        let patch = json_patch::Patch(vec![
            PatchOperation::Remove(RemoveOperation { path: "/a".into() }),
            PatchOperation::Remove(RemoveOperation { path: "/b".into() }),
        ]);
        assert!(JsonMove::from_patch_operation(&patch).is_err());
    }
}
