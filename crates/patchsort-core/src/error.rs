use thiserror::Error;

/// Errors raised by the patch sorter's public entry points.
///
/// Generators, extenders and validators never raise: they return data (an
/// empty candidate list, a `false` verdict) and let the search algorithm
/// decide what to do with it. Only the preconditions on the public `sort`
/// entry points, and the terminal "no path found" condition, surface here.
///
/// ```
/// # use patchsort_core::SorterError;
/// let err = SorterError::NoValidOrdering;
/// assert_eq!(err.to_string(), "search exhausted the state space without reaching the target");
/// ```
#[derive(Debug, Error)]
pub enum SorterError {
    /// The user-supplied patch was malformed, or a single-operation
    /// constructor was handed more (or fewer) than one operation.
    #[error("invalid input patch: {0}")]
    InvalidInputPatch(String),

    /// Applying the patch to `current` raised a `json-patch` error (bad
    /// pointer, type mismatch, failed `test`, ...).
    #[error("failed to apply patch: {0}")]
    PatchApplication(#[from] json_patch::PatchError),

    /// `validate_config(apply(patch, current))` failed.
    #[error("patch produces a target configuration that fails schema validation")]
    InvalidTarget,

    /// Strict mode only: the patch touches a table the schema does not know about.
    #[error("patch touches one or more tables without a schema")]
    PatchTouchesSchemalessTables,

    /// The search exhausted the state space (or its node budget) without
    /// reaching a state where `current == target`.
    #[error("search exhausted the state space without reaching the target")]
    NoValidOrdering,

    /// `ConfigSplitter` produced two halves that both claim the same top-level key.
    #[error("splitter configuration claims table {table:?} in both halves")]
    SplitterOverlap {
        /// The table name claimed twice.
        table: String,
    },

    /// A generator or extender produced a move that does not resolve against
    /// the side of the diff it was generated from. Indicates a bug in a
    /// generator, extender, or the `Path` it built, not a bad user input.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

/// Errors emitted when constructing [`SorterOptions`](crate::SorterOptions).
///
/// ```
/// # use patchsort_core::SorterOptions;
/// let err = SorterOptions::default().with_max_nodes(0).unwrap_err();
/// assert_eq!(err, patchsort_core::OptionsError::ZeroNodeBudget);
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// A node budget of zero would reject every patch outright.
    #[error("node budget must be at least 1")]
    ZeroNodeBudget,
}

/// Errors raised while building or querying a [`Catalog`](crate::schema::Catalog).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A table name was registered twice.
    #[error("table {0:?} is already registered")]
    DuplicateTable(String),

    /// A reference field names a target table that was never registered.
    #[error("table {table:?} declares a reference to unknown table {target:?}")]
    UnknownReferenceTarget {
        /// The table declaring the dangling reference.
        table: String,
        /// The unregistered target table name.
        target: String,
    },
}

/// Errors surfaced by the `patchsort` CLI binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or parsing one of the JSON input files failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file's contents were not valid JSON.
    #[error("failed to parse {path} as JSON: {source}")]
    Json {
        /// The file that failed to parse.
        path: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The sorter itself rejected the request.
    #[error(transparent)]
    Sorter(#[from] SorterError),
}
