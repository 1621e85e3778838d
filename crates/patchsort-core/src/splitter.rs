//! Splits a configuration into the half the schema oracle knows about
//! ("yang") and the half it doesn't, and rebases already-sorted sub-patches
//! computed against one half so they still apply cleanly against the
//! other.

use serde_json::Value;

use crate::schema::SchemaOracle;
use crate::SorterError;

/// A single sub-patch in an ordered sequence. Usually one operation (the
/// output of [`crate::PatchSorter`]), occasionally more (the coarse,
/// unordered non-yang change, or the result of rebasing).
pub type JsonChange = Vec<json_patch::PatchOperation>;

/// Splits configurations along the table boundary the schema oracle knows
/// about, and merges them back together.
#[derive(Debug, Default)]
pub struct ConfigSplitter;

impl ConfigSplitter {
    /// Partitions `config`'s top-level tables into `(yang, non_yang)`.
    #[must_use]
    pub fn split(config: &Value, oracle: &dyn SchemaOracle) -> (Value, Value) {
        let mut yang = serde_json::Map::new();
        let mut non_yang = serde_json::Map::new();
        if let Some(root) = config.as_object() {
            for (table, value) in root {
                if oracle.table_has_schema(table) {
                    yang.insert(table.clone(), value.clone());
                } else {
                    non_yang.insert(table.clone(), value.clone());
                }
            }
        }
        (Value::Object(yang), Value::Object(non_yang))
    }

    /// Merges two configurations known to claim disjoint sets of top-level
    /// tables.
    ///
    /// # Errors
    /// [`SorterError::SplitterOverlap`] if both halves declare the same table.
    pub fn merge(yang: &Value, non_yang: &Value) -> Result<Value, SorterError> {
        let mut merged = yang.as_object().cloned().unwrap_or_default();
        for (table, value) in non_yang.as_object().cloned().unwrap_or_default() {
            if merged.contains_key(&table) {
                return Err(SorterError::SplitterOverlap { table });
            }
            merged.insert(table, value);
        }
        Ok(Value::Object(merged))
    }
}

/// Rebases a sequence of [`JsonChange`]s, each computed against
/// `assumed_base` alone, so that applying them in order against
/// `assumed_base` merged with `remaining_base` still reaches the same net
/// effect.
///
/// Because [`ConfigSplitter`] partitions tables disjointly, a change
/// computed on one half never actually touches a path the other half
/// owns — rebasing is close to a no-op in the common case. It still runs
/// in full generality so the two halves can be recombined regardless of
/// how either sorter chose to express its changes (e.g. the post-processed
/// whole-config replace in [`crate::PatchSorter::sort_diff`]).
#[derive(Debug, Default)]
pub struct ChangeWrapper;

impl ChangeWrapper {
    /// Rebases `changes` (each computed against `assumed_base` alone)
    /// against the full state `assumed_base` merged with `remaining_base`.
    ///
    /// Returns one [`JsonChange`] per input change, preserving sequence
    /// length; a change that turns out to be a no-op once rebased is
    /// returned as an empty `JsonChange`.
    ///
    /// # Errors
    /// Propagates failures applying a change or merging the two halves.
    pub fn adjust_changes(
        changes: &[JsonChange],
        assumed_base: &Value,
        remaining_base: &Value,
    ) -> Result<Vec<JsonChange>, SorterError> {
        let mut running_assumed = assumed_base.clone();
        let mut out = Vec::with_capacity(changes.len());

        for change in changes {
            let pre = ConfigSplitter::merge(&running_assumed, remaining_base)?;
            let mut next_assumed = running_assumed.clone();
            json_patch::patch(&mut next_assumed, &json_patch::Patch(change.clone()))?;
            let post = ConfigSplitter::merge(&next_assumed, remaining_base)?;

            let rebased = json_patch::diff(&pre, &post);
            out.push(if rebased.0.is_empty() { JsonChange::new() } else { rebased.0 });
            running_assumed = next_assumed;
        }
        Ok(out)
    }
}
