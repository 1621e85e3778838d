//! End-to-end scenarios exercising the sorter the way a caller would: a
//! `(current, patch)` pair in, an ordered, individually-valid sequence of
//! sub-patches out.

use patchsort_core::schema::Catalog;
use patchsort_core::{PatchSorter, SchemaOracle, SorterError, SorterOptions};
use serde_json::json;

fn network_catalog() -> Catalog {
    Catalog::builder()
        .table("PORT", |t| t.create_only("lanes"))
        .table("ACL_TABLE", |t| t.reference_list("ports", "PORT"))
        .build()
        .unwrap()
}

fn replay(start: &serde_json::Value, ops: &[json_patch::PatchOperation], oracle: &Catalog) -> serde_json::Value {
    let mut state = start.clone();
    for op in ops {
        json_patch::patch(&mut state, &json_patch::Patch(vec![op.clone()])).unwrap();
        assert!(oracle.validate_config(&state), "intermediate state failed validation: {state}");
    }
    state
}

#[test]
fn port_add_orders_before_the_acl_rule_that_references_it() {
    let current = json!({});
    let patch = json_patch::Patch(vec![
        json_patch::PatchOperation::Add(json_patch::AddOperation {
            path: "/PORT".into(),
            value: json!({"Ethernet0": {"lanes": "65", "speed": "10000"}}),
        }),
        json_patch::PatchOperation::Add(json_patch::AddOperation {
            path: "/ACL_TABLE".into(),
            value: json!({"T1": {"ports": ["Ethernet0"], "stage": "ingress", "type": "L3"}}),
        }),
    ]);
    let ops = PatchSorter::new().sort(&current, &patch, &network_catalog(), &SorterOptions::default()).unwrap();

    let last_port = ops.iter().rposition(|op| op_path(op).starts_with("/PORT")).unwrap();
    let first_acl = ops.iter().position(|op| op_path(op).starts_with("/ACL_TABLE")).unwrap();
    assert!(last_port < first_acl, "every PORT change must land before ACL_TABLE references it: {ops:?}");

    let end = replay(&current, &ops, &network_catalog());
    assert_eq!(
        end,
        json!({
            "PORT": {"Ethernet0": {"lanes": "65", "speed": "10000"}},
            "ACL_TABLE": {"T1": {"ports": ["Ethernet0"], "stage": "ingress", "type": "L3"}},
        })
    );
}

#[test]
fn replacing_a_create_only_field_goes_through_remove_then_add_not_an_in_place_edit() {
    // No referrer on this row: the only validator with an opinion about a
    // whole-row (or whole-field) replace here is CreateOnlyMoveValidator.
    let current = json!({"PORT": {"Ethernet0": {"lanes": "65"}}});
    let patch = json_patch::Patch(vec![json_patch::PatchOperation::Replace(json_patch::ReplaceOperation {
        path: "/PORT/Ethernet0/lanes".into(),
        value: json!("66"),
    })]);
    let ops = PatchSorter::new().sort(&current, &patch, &network_catalog(), &SorterOptions::default()).unwrap();

    assert!(ops.len() >= 2, "a create-only field cannot move in a single in-place step");
    assert!(
        !ops.iter().any(|op| matches!(op,
            json_patch::PatchOperation::Replace(r) if r.path == "/PORT/Ethernet0/lanes"
                || r.path == "/PORT/Ethernet0"
                || r.path == "/PORT"
        )),
        "lanes is create-only and must never be replaced in place, at any granularity: {ops:?}",
    );

    let end = replay(&current, &ops, &network_catalog());
    assert_eq!(end, json!({"PORT": {"Ethernet0": {"lanes": "66"}}}));
}

#[test]
fn a_config_already_violating_unique_lanes_admits_no_valid_ordering() {
    let current = json!({"PORT": {"Ethernet0": {"lanes": "65,65"}}});
    let patch = json_patch::Patch(vec![json_patch::PatchOperation::Add(json_patch::AddOperation {
        path: "/PORT/Ethernet4".into(),
        value: json!({"lanes": "66"}),
    })]);
    let err = PatchSorter::new().sort(&current, &patch, &network_catalog(), &SorterOptions::default()).unwrap_err();
    assert!(matches!(err, SorterError::InvalidTarget | SorterError::NoValidOrdering));
}

#[test]
fn breaking_a_port_into_four_never_lets_two_ports_claim_the_same_lane() {
    let current = json!({
        "PORT": {"Ethernet0": {"lanes": "65,66,67,68", "speed": "100000"}},
        "ACL_TABLE": {"T1": {"ports": ["Ethernet0"]}},
    });
    let target = json!({
        "PORT": {
            "Ethernet0": {"lanes": "65", "speed": "25000"},
            "Ethernet1": {"lanes": "66", "speed": "25000"},
            "Ethernet2": {"lanes": "67", "speed": "25000"},
            "Ethernet3": {"lanes": "68", "speed": "25000"},
        },
        "ACL_TABLE": {"T1": {"ports": ["Ethernet0", "Ethernet1", "Ethernet2", "Ethernet3"]}},
    });
    let patch = json_patch::diff(&current, &target);

    let ops = PatchSorter::new().sort(&current, &patch, &network_catalog(), &SorterOptions::default()).unwrap();

    let mut state = current.clone();
    for op in &ops {
        json_patch::patch(&mut state, &json_patch::Patch(vec![op.clone()])).unwrap();
        assert!(network_catalog().validate_config(&state), "intermediate state failed validation: {state}");
        if let Some(ports) = state.get("PORT").and_then(|v| v.as_object()) {
            let mut seen_lanes = std::collections::HashSet::new();
            for row in ports.values() {
                let Some(lanes) = row.get("lanes").and_then(|v| v.as_str()) else { continue };
                for lane in lanes.split(',') {
                    assert!(seen_lanes.insert(lane.to_string()), "lane {lane} claimed twice mid-breakout");
                }
            }
        }
    }
    assert_eq!(state, target);
}

#[test]
fn whole_config_replace_preserves_a_table_the_schema_does_not_know_about() {
    // PORT.acl and ACL_TABLE.ports are each other's only field, so neither
    // row can be built up leaf-by-leaf: every candidate add depends on a row
    // that doesn't exist yet. The only move that ever validates is the
    // root-level replace the upper-level extender coarsens all the way up
    // to, which must still carry DEVICE_METADATA (a table the schema has
    // never heard of) verbatim.
    let cyclic_catalog = Catalog::builder()
        .table("PORT", |t| t.reference("acl", "ACL_TABLE"))
        .table("ACL_TABLE", |t| t.reference_list("ports", "PORT"))
        .build()
        .unwrap();

    let current = json!({"DEVICE_METADATA": {"localhost": {"hwsku": "x"}}});
    let target = json!({
        "DEVICE_METADATA": {"localhost": {"hwsku": "x"}},
        "PORT": {"Ethernet0": {"acl": "T1"}},
        "ACL_TABLE": {"T1": {"ports": ["Ethernet0"]}},
    });
    let patch = json_patch::diff(&current, &target);

    let ops = PatchSorter::new().sort(&current, &patch, &cyclic_catalog, &SorterOptions::default()).unwrap();

    assert_eq!(ops.len(), 1, "a genuine reference cycle only admits the root replace: {ops:?}");
    match &ops[0] {
        json_patch::PatchOperation::Replace(op) => {
            assert_eq!(op.path, "");
            assert_eq!(op.value, target, "root replace must preserve DEVICE_METADATA verbatim");
        }
        other => panic!("expected a root replace preserving DEVICE_METADATA, got {other:?}"),
    }
}

#[test]
fn removing_the_last_row_of_a_table_never_leaves_an_empty_table_mid_flight() {
    let current = json!({"PORT": {"Ethernet0": {"lanes": "65"}}});
    let target = json!({});
    let patch = json_patch::diff(&current, &target);

    let ops = PatchSorter::new().sort(&current, &patch, &network_catalog(), &SorterOptions::default()).unwrap();

    let mut state = current.clone();
    for op in &ops {
        json_patch::patch(&mut state, &json_patch::Patch(vec![op.clone()])).unwrap();
        if let Some(root) = state.as_object() {
            assert!(
                root.values().all(|table| !table.as_object().is_some_and(serde_json::Map::is_empty)),
                "found an empty top-level table mid-flight: {state}",
            );
        }
    }
    assert_eq!(state, target);
}

fn op_path(op: &json_patch::PatchOperation) -> &str {
    match op {
        json_patch::PatchOperation::Add(o) => &o.path,
        json_patch::PatchOperation::Remove(o) => &o.path,
        json_patch::PatchOperation::Replace(o) => &o.path,
        json_patch::PatchOperation::Move(o) => &o.path,
        json_patch::PatchOperation::Copy(o) => &o.path,
        json_patch::PatchOperation::Test(o) => &o.path,
    }
}
