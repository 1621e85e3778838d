//! The core entry point: turn an arbitrary JSON Patch into an ordered list
//! of sub-patches, each individually valid against the schema oracle.

use tracing::{info, instrument};

use crate::diff::Diff;
use crate::move_wrapper::MoveWrapper;
use crate::options::SorterOptions;
use crate::schema::SchemaOracle;
use crate::{algorithm, SorterError};

/// Orders an arbitrary JSON Patch into a sequence of single-operation
/// sub-patches that are each, in turn, individually valid.
///
/// This is the unsplit sorter: it treats the whole of `current` as subject
/// to the schema oracle. [`crate::NonStrictPatchSorter`] wraps this to
/// additionally tolerate tables the schema doesn't know about.
#[derive(Debug, Default)]
pub struct PatchSorter {
    wrapper: MoveWrapper,
}

impl PatchSorter {
    /// Builds a sorter using the standard extenders and validators.
    #[must_use]
    pub fn new() -> Self {
        Self { wrapper: MoveWrapper::standard() }
    }

    /// Builds a sorter with a caller-supplied move wrapper, e.g. to swap in
    /// a reduced validator set for testing.
    #[must_use]
    pub fn with_wrapper(wrapper: MoveWrapper) -> Self {
        Self { wrapper }
    }

    /// Applies `patch` to `current`, then searches for an ordering of its
    /// effect that keeps every intermediate state valid.
    ///
    /// # Errors
    /// - [`SorterError::InvalidInputPatch`] if `patch` cannot be applied to `current`.
    /// - [`SorterError::InvalidTarget`] if the resulting configuration fails schema validation.
    /// - [`SorterError::NoValidOrdering`] if no ordering keeps every step valid.
    #[instrument(skip(self, current, patch, oracle, options))]
    pub fn sort(
        &self,
        current: &serde_json::Value,
        patch: &json_patch::Patch,
        oracle: &dyn SchemaOracle,
        options: &SorterOptions,
    ) -> Result<Vec<json_patch::PatchOperation>, SorterError> {
        let mut target = current.clone();
        json_patch::patch(&mut target, patch)
            .map_err(|e| SorterError::InvalidInputPatch(e.to_string()))?;

        if !oracle.validate_config(&target) {
            return Err(SorterError::InvalidTarget);
        }

        self.sort_diff(current.clone(), target, oracle, options)
    }

    /// The same search as [`PatchSorter::sort`], but starting from an
    /// already-known `(current, target)` pair rather than a patch to apply
    /// first. Used by [`crate::NonStrictPatchSorter`], which computes the
    /// yang-only halves of `current`/`target` itself.
    pub fn sort_diff(
        &self,
        current: serde_json::Value,
        target: serde_json::Value,
        oracle: &dyn SchemaOracle,
        options: &SorterOptions,
    ) -> Result<Vec<json_patch::PatchOperation>, SorterError> {
        let diff = Diff::new(current, target);
        let moves = algorithm::search(&diff, &self.wrapper, oracle, options)?;
        info!(steps = moves.len(), "sorted patch into ordered sub-patches");

        let mut ops = Vec::with_capacity(moves.len());
        let mut state = diff;
        for mv in &moves {
            ops.push(mv.compile(&state)?);
            state = state.apply_move(mv)?;
        }

        // A single root-level replace wins whenever the schema declares
        // table(s) it cannot itself reason about: such a table's contents
        // are opaque, so the only honest move is to replace the whole
        // configuration with the post-patch target, rather than claim a
        // field-by-field ordering the oracle never actually checked.
        if let [json_patch::PatchOperation::Replace(op)] = ops.as_slice() {
            if op.path.is_empty() {
                if let Some(root) = state.current().as_object() {
                    if root.keys().any(|table| !oracle.table_has_schema(table)) {
                        return Ok(vec![json_patch::PatchOperation::Replace(json_patch::ReplaceOperation {
                            path: String::new(),
                            value: state.target().clone(),
                        })]);
                    }
                }
            }
        }

        Ok(ops)
    }
}
