//! Fuzzing harnesses for the `patchsort` state-space patch sorter.
//!
//! [`FuzzInput`] describes a bounded sequence of table edits applied twice
//! — once to build `current`, once more (continuing from `current`) to
//! build `target` — so [`fuzz_sort`] always has a patch whose target is, by
//! construction, reachable. The property under test is that whenever the
//! sorter succeeds, replaying its output against `current` reproduces
//! `target` exactly.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::{Arbitrary, Unstructured};
use patchsort_core::schema::Catalog;
use patchsort_core::{NonStrictPatchSorter, SchemaOracle, SorterOptions};
use serde_json::{json, Value};

const PORT_NAMES: [&str; 4] = ["Ethernet0", "Ethernet4", "Ethernet8", "Ethernet12"];
const LANE_CHOICES: [&str; 4] = ["65", "66", "67", "68"];

/// One bounded table edit, used to build up a configuration deterministically
/// from fuzzer-supplied bytes.
#[derive(Debug, Clone, Arbitrary)]
pub enum FuzzOp {
    /// Add (or overwrite) a `PORT` row.
    AddPort {
        /// Index into the fixed port-name list, taken modulo its length.
        port: u8,
        /// Index into the fixed lane-choice list, taken modulo its length.
        lanes: u8,
    },
    /// Remove a `PORT` row.
    RemovePort {
        /// Index into the fixed port-name list, taken modulo its length.
        port: u8,
    },
    /// Add (or overwrite) an `ACL_TABLE` rule referencing up to a few ports.
    AddAclRule {
        /// Rule index, taken modulo 2 (bounds the table to 2 rules).
        rule: u8,
        /// Indices into the fixed port-name list this rule's `ports` list references.
        ports: Vec<u8>,
    },
    /// Remove an `ACL_TABLE` rule.
    RemoveAclRule {
        /// Rule index, taken modulo 2.
        rule: u8,
    },
}

/// The fuzzer's top-level input: two op sequences (`current` built from the
/// first, `target` from the first followed by the second).
#[derive(Debug, Clone, Arbitrary)]
pub struct FuzzInput {
    /// Ops applied to the empty configuration to build `current`.
    pub current_ops: Vec<FuzzOp>,
    /// Ops applied on top of `current` to build `target`.
    pub target_ops: Vec<FuzzOp>,
}

impl FuzzInput {
    /// Parses a `FuzzInput` from raw fuzzer bytes, or `None` if `data` is
    /// too short to produce one (not a bug — `cargo fuzz` expects this).
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let mut u = Unstructured::new(data);
        Self::arbitrary(&mut u).ok()
    }
}

fn apply_ops(mut config: Value, ops: &[FuzzOp]) -> Value {
    let root = config.as_object_mut().expect("config is always an object");
    for op in ops {
        match op {
            FuzzOp::AddPort { port, lanes } => {
                let name = PORT_NAMES[*port as usize % PORT_NAMES.len()];
                let lanes = LANE_CHOICES[*lanes as usize % LANE_CHOICES.len()];
                let table = root.entry("PORT").or_insert_with(|| json!({}));
                table.as_object_mut().unwrap().insert(name.to_string(), json!({"lanes": lanes}));
            }
            FuzzOp::RemovePort { port } => {
                let name = PORT_NAMES[*port as usize % PORT_NAMES.len()];
                if let Some(table) = root.get_mut("PORT").and_then(Value::as_object_mut) {
                    table.remove(name);
                }
            }
            FuzzOp::AddAclRule { rule, ports } => {
                let rule_name = format!("RULE_{}", *rule as usize % 2);
                let referenced: Vec<Value> = ports
                    .iter()
                    .map(|p| json!(PORT_NAMES[*p as usize % PORT_NAMES.len()]))
                    .collect();
                let table = root.entry("ACL_TABLE").or_insert_with(|| json!({}));
                table.as_object_mut().unwrap().insert(rule_name, json!({"ports": referenced}));
            }
            FuzzOp::RemoveAclRule { rule } => {
                let rule_name = format!("RULE_{}", *rule as usize % 2);
                if let Some(table) = root.get_mut("ACL_TABLE").and_then(Value::as_object_mut) {
                    table.remove(&rule_name);
                }
            }
        }
    }
    // Drop tables the edits left empty: the generator/validators treat an
    // empty table the same as an absent one, so keeping it would make a
    // round-trip comparison fail for reasons that have nothing to do with
    // the sorter's correctness.
    root.retain(|_, v| !v.as_object().is_some_and(serde_json::Map::is_empty));
    config
}

fn catalog() -> Catalog {
    Catalog::builder()
        .table("PORT", |t| t.create_only("lanes"))
        .table("ACL_TABLE", |t| t.reference_list("ports", "PORT"))
        .build()
        .expect("fixed catalog is internally consistent")
}

/// Runs one fuzz iteration: builds `current`/`target` from `input`, diffs
/// them, sorts the diff, and checks the round-trip property. Panics (the
/// fuzzer's signal for "found a bug") if the sorter succeeds but its output
/// does not reach `target`.
pub fn fuzz_sort(input: &FuzzInput) {
    let catalog = catalog();
    let current = apply_ops(json!({}), &input.current_ops);
    let target = apply_ops(current.clone(), &input.target_ops);

    if !catalog.validate_config(&target) {
        return;
    }

    let patch = json_patch::diff(&current, &target);
    if patch.0.is_empty() {
        return;
    }

    let options = SorterOptions::default().with_max_nodes(2_000).expect("2_000 is a valid budget");
    let Ok(changes) = NonStrictPatchSorter::new().sort(&current, &patch, &catalog, &options) else {
        return;
    };

    let mut state = current;
    for change in &changes {
        json_patch::patch(&mut state, &json_patch::Patch(change.clone()))
            .expect("every emitted change must apply cleanly to the state it was computed against");
    }
    assert_eq!(state, target, "sorted changes did not reach the target configuration");
}

/// Entry point for the `cargo fuzz` harness in the workspace's top-level
/// `fuzz/` directory.
pub fn fuzz_from_bytes(data: &[u8]) {
    if let Some(input) = FuzzInput::from_bytes(data) {
        fuzz_sort(&input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_port_then_acl_rule_round_trips() {
        let input = FuzzInput {
            current_ops: vec![],
            target_ops: vec![
                FuzzOp::AddPort { port: 0, lanes: 0 },
                FuzzOp::AddAclRule { rule: 0, ports: vec![0] },
            ],
        };
        fuzz_sort(&input);
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let input = FuzzInput { current_ops: vec![], target_ops: vec![] };
        fuzz_sort(&input);
    }

    #[test]
    fn removing_a_referenced_port_is_handled_without_panicking() {
        let input = FuzzInput {
            current_ops: vec![
                FuzzOp::AddPort { port: 1, lanes: 1 },
                FuzzOp::AddAclRule { rule: 0, ports: vec![1] },
            ],
            target_ops: vec![FuzzOp::RemovePort { port: 1 }],
        };
        fuzz_sort(&input);
    }
}
