use std::fmt;

use serde::{Deserialize, Serialize};

use crate::OptionsError;

/// The search strategy the sorter explores the state space with.
///
/// All three strategies are sound (they only ever emit moves that pass
/// every validator) and complete over the same bounded state space; they
/// differ in which of the equally-valid orderings they happen to return
/// first, and in their memory/time tradeoff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmKind {
    /// Depth-first search. Low memory, returns the first ordering found
    /// along whichever branch the extender/validator order favors.
    #[default]
    Dfs,
    /// Breadth-first search. Returns a shortest ordering, at the cost of
    /// holding an entire frontier in memory.
    Bfs,
    /// Depth-first search with memoization of dead-end diffs, trading
    /// memory for avoiding repeated exploration of the same state.
    Memoization,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmKind::Dfs => f.write_str("dfs"),
            AlgorithmKind::Bfs => f.write_str("bfs"),
            AlgorithmKind::Memoization => f.write_str("memoization"),
        }
    }
}

/// Configuration knobs passed to [`PatchSorter`](crate::PatchSorter) and friends.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SorterOptions {
    algorithm: AlgorithmKind,
    max_nodes: usize,
}

impl Default for SorterOptions {
    fn default() -> Self {
        Self { algorithm: AlgorithmKind::Dfs, max_nodes: 50_000 }
    }
}

impl SorterOptions {
    /// Returns the configured search strategy.
    ///
    /// ```
    /// # use patchsort_core::{AlgorithmKind, SorterOptions};
    /// let opts = SorterOptions::default()
    ///     .with_algorithm(AlgorithmKind::Bfs);
    /// assert_eq!(opts.algorithm(), AlgorithmKind::Bfs);
    /// ```
    #[must_use]
    pub fn algorithm(&self) -> AlgorithmKind {
        self.algorithm
    }

    /// Returns the maximum number of distinct diffs the search may visit
    /// before giving up with [`SorterError::NoValidOrdering`](crate::SorterError::NoValidOrdering).
    #[must_use]
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Sets the search strategy.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the node visit budget.
    ///
    /// ```
    /// # use patchsort_core::SorterOptions;
    /// let err = SorterOptions::default().with_max_nodes(0).unwrap_err();
    /// assert_eq!(err, patchsort_core::OptionsError::ZeroNodeBudget);
    /// ```
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Result<Self, OptionsError> {
        if max_nodes == 0 {
            return Err(OptionsError::ZeroNodeBudget);
        }
        self.max_nodes = max_nodes;
        Ok(self)
    }
}
