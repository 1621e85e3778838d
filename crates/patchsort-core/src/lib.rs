//! State-space search that orders an arbitrary JSON Patch into a sequence
//! of sub-patches that are each, individually, valid against a schema and
//! dependency oracle.
//!
//! A device configuration management system is usually handed a patch
//! whose operations, applied in their original order, would pass through
//! invalid intermediate states — a row that references another table's
//! entry before that entry exists, a field that can only be set at row
//! creation being edited on a surviving row, and so on. This crate searches
//! the space of orderings (and, where a literal reordering isn't enough,
//! coarser equivalent moves) for one where every intermediate state is
//! acceptable.
//!
//! The schema/dependency oracle itself — deciding whether a configuration
//! is internally consistent, and what references what — is an external
//! concern modeled by the [`SchemaOracle`] trait. [`schema::Catalog`] is a
//! small in-memory reference implementation used by this crate's own
//! tests and by the CLI.
//!
//! # Examples
//!
//! ```
//! use patchsort_core::schema::Catalog;
//! use patchsort_core::{PatchSorter, SorterOptions};
//! use serde_json::json;
//!
//! let catalog = Catalog::builder()
//!     .table("PORT", |t| t.create_only("lanes"))
//!     .table("ACL_TABLE", |t| t.reference_list("ports", "PORT"))
//!     .build()
//!     .unwrap();
//!
//! let current = json!({});
//! let patch = json_patch::Patch(vec![
//!     json_patch::PatchOperation::Add(json_patch::AddOperation {
//!         path: "/ACL_TABLE".into(),
//!         value: json!({"T1": {"ports": ["Ethernet0"]}}),
//!     }),
//!     json_patch::PatchOperation::Add(json_patch::AddOperation {
//!         path: "/PORT".into(),
//!         value: json!({"Ethernet0": {"lanes": "65"}}),
//!     }),
//! ]);
//!
//! let ops = PatchSorter::new()
//!     .sort(&current, &patch, &catalog, &SorterOptions::default())
//!     .unwrap();
//! // PORT is added before ACL_TABLE references it, regardless of the
//! // order the caller wrote them in.
//! assert_eq!(ops[0].clone(), json_patch::PatchOperation::Add(json_patch::AddOperation {
//!     path: "/PORT".into(),
//!     value: json!({"Ethernet0": {"lanes": "65"}}),
//! }));
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
mod diff;
pub mod extenders;
mod generator;
pub mod json_move;
mod move_wrapper;
mod options;
mod outer;
mod patch_sorter;
pub mod schema;
mod splitter;
pub mod validators;

mod error;
mod hash;
mod path;

pub use diff::Diff;
pub use error::{CliError, OptionsError, SchemaError, SorterError};
pub use hash::{combine, combine_ordered, hash_bytes, hash_value, HashCode};
pub use json_move::JsonMove;
pub use move_wrapper::MoveWrapper;
pub use options::{AlgorithmKind, SorterOptions};
pub use outer::{NonStrictPatchSorter, StrictPatchSorter};
pub use patch_sorter::PatchSorter;
pub use path::{Path, Token};
pub use schema::SchemaOracle;
pub use splitter::{ChangeWrapper, ConfigSplitter, JsonChange};

/// Returns the semantic version of the `patchsort-core` crate.
///
/// ```
/// assert!(!patchsort_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
