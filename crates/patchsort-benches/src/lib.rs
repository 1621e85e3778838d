//! Synthetic datasets for benchmarking the patch sorter's search algorithms.
//!
//! Real device configurations vary wildly in shape, so benchmarks here use a
//! generated PORT/ACL_TABLE pair scaled by a single `size` parameter rather
//! than a fixture corpus: it keeps the growth curve (nodes visited vs. table
//! size) legible across algorithm choices.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use patchsort_core::schema::Catalog;
use serde_json::{json, Value};

/// A current/target configuration pair plus the catalog that describes it.
pub struct Dataset {
    /// The configuration before the patch.
    pub current: Value,
    /// The configuration after the patch.
    pub target: Value,
    /// Schema oracle describing `PORT` and `ACL_TABLE`.
    pub catalog: Catalog,
}

/// Builds a dataset with `size` ports and `size / 4` ACL rules (at least
/// one), where `current` is empty and `target` has every row added — the
/// worst case for a sorter that must discover a full creation order.
#[must_use]
pub fn synthetic_dataset(size: usize) -> Dataset {
    let catalog = Catalog::builder()
        .table("PORT", |t| t.create_only("lanes"))
        .table("ACL_TABLE", |t| t.reference_list("ports", "PORT"))
        .build()
        .expect("fixed catalog is internally consistent");

    let mut ports = serde_json::Map::new();
    for i in 0..size {
        ports.insert(format!("Ethernet{i}"), json!({"lanes": (i % 4).to_string()}));
    }

    let rule_count = (size / 4).max(1);
    let mut rules = serde_json::Map::new();
    for i in 0..rule_count {
        let referenced: Vec<Value> = (0..size.min(4))
            .map(|j| json!(format!("Ethernet{}", (i * 4 + j) % size.max(1))))
            .collect();
        rules.insert(format!("RULE_{i}"), json!({"ports": referenced}));
    }

    let target = json!({"PORT": Value::Object(ports), "ACL_TABLE": Value::Object(rules)});
    Dataset { current: json!({}), target, catalog }
}
