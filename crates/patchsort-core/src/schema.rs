//! The schema/dependency oracle contract, plus a small in-memory reference
//! implementation used by this crate's own tests and by the CLI's
//! `--schema` flag.
//!
//! The real oracle behind a production deployment is out of scope: it is
//! whatever system already understands the target schema language (YANG,
//! a database's own DDL, ...). [`Catalog`] exists so the sorter is runnable
//! and testable standalone, and so its contract ([`SchemaOracle`]) has at
//! least one concrete, auditable implementation to check against.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::path::{Path, Token};
use crate::SchemaError;

/// Everything a [`crate::PatchSorter`] needs to know about the schema that
/// governs a configuration tree.
///
/// Implementations are expected to be pure functions of their inputs: no
/// interior mutability, no I/O. The search calls these methods many times
/// per candidate move.
pub trait SchemaOracle {
    /// Does `config` satisfy every structural and referential constraint
    /// the schema declares? Called once, on the target configuration,
    /// before search begins — not on every intermediate state, since
    /// intermediate states are expected to be partially invalid.
    fn validate_config(&self, config: &Value) -> bool;

    /// Every location in `config` whose value is a reference naming `path`
    /// or one of its descendants (e.g. a table row key used as an entry in
    /// another table's `ports` list).
    fn find_references(&self, config: &Value, path: &Path) -> Vec<Path>;

    /// The dual of [`SchemaOracle::find_references`]: the locations that
    /// the reference field(s) *at* `path` point to. Used by
    /// [`crate::validators::NoDependencyMoveValidator`] to check that an
    /// add move does not depend on a row that doesn't exist yet.
    fn dependencies(&self, config: &Value, path: &Path) -> Vec<Path>;

    /// Does the schema know about a top-level table named `table`?
    fn table_has_schema(&self, table: &str) -> bool;

    /// Is the field addressed by `path` create-only (it may be set when its
    /// row is created or removed along with its row, but never modified in
    /// place while the row continues to exist)?
    fn is_create_only(&self, path: &Path) -> bool;

    /// Strict-mode precondition: does every operation in `patch` address a
    /// table the schema knows about?
    fn validate_patch_only_tables_with_schema(&self, patch: &json_patch::Patch) -> bool {
        for op in &patch.0 {
            let raw_path = match op {
                json_patch::PatchOperation::Add(o) => &o.path,
                json_patch::PatchOperation::Remove(o) => &o.path,
                json_patch::PatchOperation::Replace(o) => &o.path,
                json_patch::PatchOperation::Move(o) => &o.path,
                json_patch::PatchOperation::Copy(o) => &o.path,
                json_patch::PatchOperation::Test(o) => &o.path,
            };
            let Ok(path) = Path::decode(raw_path) else { return false };
            match path.tokens().first() {
                Some(Token::Key(table)) => {
                    if !self.table_has_schema(table) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// Declares how a single field within a table's rows behaves.
#[derive(Clone, Debug)]
struct FieldSchema {
    create_only: bool,
    reference_target_table: Option<String>,
    reference_is_list: bool,
}

/// Declares the fields a table's rows may carry.
#[derive(Clone, Debug, Default)]
struct TableSchema {
    fields: BTreeMap<String, FieldSchema>,
}

/// A small, explicit, in-memory [`SchemaOracle`].
///
/// Built with [`CatalogBuilder`]; see the crate's integration tests for the
/// PORT / ACL_TABLE / LOOPBACK_INTERFACE fixtures used throughout this
/// crate's own test suite.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    tables: BTreeMap<String, TableSchema>,
}

impl Catalog {
    /// Starts building a new catalog.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    fn field<'a>(&'a self, table: &str, field: &str) -> Option<&'a FieldSchema> {
        self.table(table)?.fields.get(field)
    }

    /// Row keys (the second path segment) of every instance of `table`
    /// present in `config`.
    fn row_keys<'v>(config: &'v Value, table: &str) -> Vec<(&'v String, &'v Value)> {
        config
            .get(table)
            .and_then(Value::as_object)
            .map(|rows| rows.iter().collect())
            .unwrap_or_default()
    }

    fn reference_values(row: &Value, field: &FieldSchema, field_name: &str) -> Vec<String> {
        let Some(value) = row.get(field_name) else { return Vec::new() };
        if field.reference_is_list {
            value
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        } else {
            value.as_str().map(str::to_string).into_iter().collect()
        }
    }
}

impl SchemaOracle for Catalog {
    fn validate_config(&self, config: &Value) -> bool {
        let Some(root) = config.as_object() else { return false };
        for (table_name, schema) in &self.tables {
            let Some(rows) = root.get(table_name) else { continue };
            let Some(rows) = rows.as_object() else { return false };
            for (_, row) in rows {
                let Some(row) = row.as_object() else { return false };
                for (field_name, field) in &schema.fields {
                    let Some(target_table) = &field.reference_target_table else { continue };
                    for referenced_key in Self::reference_values(&Value::Object(row.clone()), field, field_name) {
                        let target_exists = root
                            .get(target_table)
                            .and_then(Value::as_object)
                            .is_some_and(|rows| rows.contains_key(&referenced_key));
                        if !target_exists {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    fn find_references(&self, config: &Value, path: &Path) -> Vec<Path> {
        let toks = path.tokens();
        let Some(Token::Key(target_table)) = toks.first() else { return Vec::new() };
        // Any row of `target_table`, or a specific one if `path` names it.
        let target_keys: Vec<String> = match toks.get(1) {
            Some(Token::Key(key)) => vec![key.clone()],
            _ => Self::row_keys(config, target_table).into_iter().map(|(k, _)| k.clone()).collect(),
        };

        let mut out = Vec::new();
        for (referring_table, schema) in &self.tables {
            for (field_name, field) in &schema.fields {
                if field.reference_target_table.as_deref() != Some(target_table.as_str()) {
                    continue;
                }
                for (row_key, row) in Self::row_keys(config, referring_table) {
                    let Some(value) = row.get(field_name) else { continue };
                    if field.reference_is_list {
                        for (idx, entry) in value.as_array().into_iter().flatten().enumerate() {
                            if entry.as_str().is_some_and(|s| target_keys.iter().any(|k| k == s)) {
                                out.push(Path::from_tokens(vec![
                                    Token::Key(referring_table.clone()),
                                    Token::Key(row_key.clone()),
                                    Token::Key(field_name.clone()),
                                    Token::Index(idx),
                                ]));
                            }
                        }
                    } else if value.as_str().is_some_and(|s| target_keys.iter().any(|k| k == s)) {
                        out.push(Path::from_tokens(vec![
                            Token::Key(referring_table.clone()),
                            Token::Key(row_key.clone()),
                            Token::Key(field_name.clone()),
                        ]));
                    }
                }
            }
        }
        out
    }

    fn dependencies(&self, config: &Value, path: &Path) -> Vec<Path> {
        let toks = path.tokens();
        let (Some(Token::Key(table)), row_key) = (toks.first(), toks.get(1)) else { return Vec::new() };
        let Some(schema) = self.table(table) else { return Vec::new() };

        let rows: Vec<(&String, &Value)> = match row_key {
            Some(Token::Key(key)) => {
                Self::row_keys(config, table).into_iter().filter(|(k, _)| *k == key).collect()
            }
            _ => Self::row_keys(config, table),
        };

        let mut out = Vec::new();
        for (_, row) in rows {
            for (field_name, field) in &schema.fields {
                let Some(target_table) = &field.reference_target_table else { continue };
                for referenced_key in Self::reference_values(row, field, field_name) {
                    out.push(Path::from_tokens(vec![
                        Token::Key(target_table.clone()),
                        Token::Key(referenced_key),
                    ]));
                }
            }
        }
        out
    }

    fn table_has_schema(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    fn is_create_only(&self, path: &Path) -> bool {
        let toks = path.tokens();
        let (Some(Token::Key(table)), Some(Token::Key(field))) = (toks.first(), toks.get(2)) else {
            return false;
        };
        self.field(table, field).is_some_and(|f| f.create_only)
    }
}

/// Declares one table's schema while building a [`Catalog`].
#[derive(Clone, Debug, Default)]
pub struct TableSchemaBuilder {
    fields: BTreeMap<String, FieldSchema>,
}

impl TableSchemaBuilder {
    /// Marks `field` as create-only.
    #[must_use]
    pub fn create_only(mut self, field: impl Into<String>) -> Self {
        self.fields.entry(field.into()).or_insert_with(|| FieldSchema {
            create_only: false,
            reference_target_table: None,
            reference_is_list: false,
        }).create_only = true;
        self
    }

    /// Declares `field` as a single-valued leafref into `target_table`.
    #[must_use]
    pub fn reference(mut self, field: impl Into<String>, target_table: impl Into<String>) -> Self {
        let entry = self.fields.entry(field.into()).or_insert_with(|| FieldSchema {
            create_only: false,
            reference_target_table: None,
            reference_is_list: false,
        });
        entry.reference_target_table = Some(target_table.into());
        entry.reference_is_list = false;
        self
    }

    /// Declares `field` as a list-valued leafref into `target_table`.
    #[must_use]
    pub fn reference_list(mut self, field: impl Into<String>, target_table: impl Into<String>) -> Self {
        let entry = self.fields.entry(field.into()).or_insert_with(|| FieldSchema {
            create_only: false,
            reference_target_table: None,
            reference_is_list: false,
        });
        entry.reference_target_table = Some(target_table.into());
        entry.reference_is_list = true;
        self
    }
}

/// Builds a [`Catalog`] one table at a time.
///
/// ```
/// # use patchsort_core::schema::Catalog;
/// # use patchsort_core::SchemaOracle;
/// let catalog = Catalog::builder()
///     .table("PORT", |t| t.create_only("lanes"))
///     .table("ACL_TABLE", |t| t.reference_list("ports", "PORT"))
///     .build()
///     .unwrap();
/// assert!(catalog.table_has_schema("PORT"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CatalogBuilder {
    tables: BTreeMap<String, TableSchema>,
    duplicate_table: Option<String>,
}

impl CatalogBuilder {
    /// Declares a table, configuring its fields via `configure`.
    ///
    /// Registering the same table name twice is remembered rather than
    /// rejected immediately (this method isn't fallible), and surfaces as
    /// [`SchemaError::DuplicateTable`] from [`CatalogBuilder::build`].
    #[must_use]
    pub fn table(mut self, name: impl Into<String>, configure: impl FnOnce(TableSchemaBuilder) -> TableSchemaBuilder) -> Self {
        let name = name.into();
        let built = configure(TableSchemaBuilder::default());
        if self.tables.insert(name.clone(), TableSchema { fields: built.fields }).is_some() && self.duplicate_table.is_none() {
            self.duplicate_table = Some(name);
        }
        self
    }

    /// Validates cross-table reference declarations and builds the catalog.
    ///
    /// # Errors
    /// [`SchemaError::DuplicateTable`] if the same table name was registered
    /// more than once, or [`SchemaError::UnknownReferenceTarget`] if a
    /// reference field names a table that was never registered.
    pub fn build(self) -> Result<Catalog, SchemaError> {
        if let Some(table) = self.duplicate_table {
            return Err(SchemaError::DuplicateTable(table));
        }
        for (table, schema) in &self.tables {
            for field in schema.fields.values() {
                if let Some(target) = &field.reference_target_table {
                    if !self.tables.contains_key(target) {
                        return Err(SchemaError::UnknownReferenceTarget {
                            table: table.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }
        Ok(Catalog { tables: self.tables })
    }
}

/// A declarative, serializable description of a [`Catalog`], for loading a
/// schema from a JSON file (see the `patchsort` CLI's `--schema` flag).
///
/// ```
/// # use patchsort_core::schema::SchemaDescription;
/// # use patchsort_core::SchemaOracle;
/// let json = r#"{
///     "PORT": {"create_only": ["lanes"], "references": {}},
///     "ACL_TABLE": {"create_only": [], "references": {"ports": {"target": "PORT", "list": true}}}
/// }"#;
/// let description: SchemaDescription = serde_json::from_str(json).unwrap();
/// let catalog = description.into_catalog().unwrap();
/// assert!(catalog.table_has_schema("ACL_TABLE"));
/// ```
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(transparent)]
pub struct SchemaDescription(BTreeMap<String, TableDescription>);

#[derive(Clone, Debug, serde::Deserialize)]
struct TableDescription {
    #[serde(default)]
    create_only: Vec<String>,
    #[serde(default)]
    references: BTreeMap<String, ReferenceDescription>,
}

#[derive(Clone, Debug, serde::Deserialize)]
struct ReferenceDescription {
    target: String,
    #[serde(default)]
    list: bool,
}

impl SchemaDescription {
    /// Builds the [`Catalog`] this description declares.
    ///
    /// # Errors
    /// [`SchemaError::UnknownReferenceTarget`] if a reference names a table
    /// not present in this description.
    pub fn into_catalog(self) -> Result<Catalog, SchemaError> {
        let mut builder = Catalog::builder();
        for (table, description) in self.0 {
            builder = builder.table(table, |mut t| {
                for field in description.create_only {
                    t = t.create_only(field);
                }
                for (field, reference) in description.references {
                    t = if reference.list {
                        t.reference_list(field, reference.target)
                    } else {
                        t.reference(field, reference.target)
                    };
                }
                t
            });
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_catalog() -> Catalog {
        Catalog::builder()
            .table("PORT", |t| t.create_only("lanes"))
            .table("ACL_TABLE", |t| t.reference_list("ports", "PORT"))
            .build()
            .unwrap()
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let err = Catalog::builder()
            .table("PORT", |t| t.create_only("lanes"))
            .table("PORT", |t| t.create_only("speed"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateTable("PORT".to_string()));
    }

    #[test]
    fn unknown_reference_target_is_rejected() {
        let err = Catalog::builder()
            .table("ACL_TABLE", |t| t.reference_list("ports", "PORT"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownReferenceTarget { .. }));
    }

    #[test]
    fn find_references_locates_the_referring_list_entry() {
        let catalog = test_catalog();
        let config = json!({
            "PORT": {"Ethernet0": {"lanes": "65"}},
            "ACL_TABLE": {"T1": {"ports": ["Ethernet0"]}},
        });
        let refs = catalog.find_references(&config, &Path::decode("/PORT/Ethernet0").unwrap());
        let expected = Path::decode("/ACL_TABLE/T1/ports").unwrap().child(Token::Index(0));
        assert_eq!(refs, vec![expected]);
    }

    #[test]
    fn dependencies_is_the_dual_of_find_references() {
        let catalog = test_catalog();
        let config = json!({
            "PORT": {"Ethernet0": {"lanes": "65"}},
            "ACL_TABLE": {"T1": {"ports": ["Ethernet0"]}},
        });
        let deps = catalog.dependencies(&config, &Path::decode("/ACL_TABLE/T1").unwrap());
        assert_eq!(deps, vec![Path::decode("/PORT/Ethernet0").unwrap()]);
    }

    #[test]
    fn validate_config_rejects_dangling_reference() {
        let catalog = test_catalog();
        let config = json!({"ACL_TABLE": {"T1": {"ports": ["Ethernet0"]}}});
        assert!(!catalog.validate_config(&config));
    }

    #[test]
    fn is_create_only_checks_the_declared_field() {
        let catalog = test_catalog();
        assert!(catalog.is_create_only(&Path::decode("/PORT/Ethernet0/lanes").unwrap()));
        assert!(!catalog.is_create_only(&Path::decode("/PORT/Ethernet0/speed").unwrap()));
    }
}
