//! The two public sorting modes: strict (reject any patch touching a table
//! the schema doesn't know) and non-strict (split the config, sort the
//! known half, pass the rest through untouched).

use tracing::instrument;

use crate::options::SorterOptions;
use crate::patch_sorter::PatchSorter;
use crate::schema::SchemaOracle;
use crate::splitter::{ChangeWrapper, ConfigSplitter, JsonChange};
use crate::SorterError;

/// Sorts a patch under the assumption that every table it touches has a
/// schema. Rejects the patch outright otherwise, rather than silently
/// passing schemaless edits through unordered.
#[derive(Debug, Default)]
pub struct StrictPatchSorter {
    inner: PatchSorter,
}

impl StrictPatchSorter {
    /// Builds a sorter using the standard extenders and validators.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: PatchSorter::new() }
    }

    /// Sorts `patch` into individually-valid sub-patches.
    ///
    /// # Errors
    /// [`SorterError::PatchTouchesSchemalessTables`] if any operation
    /// addresses a table the oracle doesn't recognize; otherwise the same
    /// errors as [`PatchSorter::sort`].
    #[instrument(skip(self, current, patch, oracle, options))]
    pub fn sort(
        &self,
        current: &serde_json::Value,
        patch: &json_patch::Patch,
        oracle: &dyn SchemaOracle,
        options: &SorterOptions,
    ) -> Result<Vec<json_patch::PatchOperation>, SorterError> {
        if !oracle.validate_patch_only_tables_with_schema(patch) {
            return Err(SorterError::PatchTouchesSchemalessTables);
        }
        self.inner.sort(current, patch, oracle, options)
    }
}

/// Sorts a patch that may touch both schema-known and schema-unknown
/// tables, by splitting `current`/`target` along that boundary, sorting
/// the known half, and passing the unknown half through as one coarse,
/// unordered change.
#[derive(Debug, Default)]
pub struct NonStrictPatchSorter {
    inner: PatchSorter,
}

impl NonStrictPatchSorter {
    /// Builds a sorter using the standard extenders and validators.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: PatchSorter::new() }
    }

    /// Sorts `patch` into an ordered sequence of [`JsonChange`]s. Yang-table
    /// changes are individually validated and ordered; non-yang changes are
    /// emitted as a single unchecked, unordered change.
    ///
    /// # Errors
    /// Same as [`PatchSorter::sort_diff`], applied to the yang-only half.
    #[instrument(skip(self, current, patch, oracle, options))]
    pub fn sort(
        &self,
        current: &serde_json::Value,
        patch: &json_patch::Patch,
        oracle: &dyn SchemaOracle,
        options: &SorterOptions,
    ) -> Result<Vec<JsonChange>, SorterError> {
        let mut target = current.clone();
        json_patch::patch(&mut target, patch)
            .map_err(|e| SorterError::InvalidInputPatch(e.to_string()))?;

        let (current_yang, current_non_yang) = ConfigSplitter::split(current, oracle);
        let (target_yang, target_non_yang) = ConfigSplitter::split(&target, oracle);

        if !oracle.validate_config(&target_yang) {
            return Err(SorterError::InvalidTarget);
        }

        let yang_ops = self.inner.sort_diff(current_yang.clone(), target_yang, oracle, options)?;
        let yang_changes: Vec<JsonChange> = yang_ops.into_iter().map(|op| vec![op]).collect();

        let non_yang_patch = json_patch::diff(&current_non_yang, &target_non_yang);
        let non_yang_changes: Vec<JsonChange> =
            if non_yang_patch.0.is_empty() { Vec::new() } else { vec![non_yang_patch.0] };

        let yang_changes = ChangeWrapper::adjust_changes(&yang_changes, &current_yang, &current_non_yang)?;
        let non_yang_changes = ChangeWrapper::adjust_changes(&non_yang_changes, &current_non_yang, &current_yang)?;

        let mut changes = non_yang_changes;
        changes.extend(yang_changes);
        Ok(changes.into_iter().filter(|c| !c.is_empty()).collect())
    }
}
