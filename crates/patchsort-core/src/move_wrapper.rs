//! Wires the generator, extenders and validators together into the single
//! "what moves can I make from here, and is each one allowed" surface the
//! search algorithms (see [`crate::algorithm`]) call against.

use std::collections::HashSet;

use tracing::trace;

use crate::diff::Diff;
use crate::extenders::{DeleteInsteadOfReplaceMoveExtender, DeleteRefsMoveExtender, MoveExtender, UpperLevelMoveExtender};
use crate::generator::low_level_moves;
use crate::json_move::JsonMove;
use crate::schema::SchemaOracle;
use crate::validators::{
    CreateOnlyMoveValidator, DeleteWholeConfigMoveValidator, FullConfigMoveValidator, MoveValidator,
    NoDependencyMoveValidator, NoEmptyTableMoveValidator, UniqueLanesMoveValidator,
};
use crate::SorterError;

/// Generates and validates candidate moves for a given diff.
///
/// Built once per sort and shared across every node the search visits.
pub struct MoveWrapper {
    extenders: Vec<Box<dyn MoveExtender + Send + Sync>>,
    validators: Vec<Box<dyn MoveValidator + Send + Sync>>,
}

impl MoveWrapper {
    /// The standard set of extenders and validators this crate ships.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            extenders: vec![
                Box::new(UpperLevelMoveExtender),
                Box::new(DeleteInsteadOfReplaceMoveExtender),
                Box::new(DeleteRefsMoveExtender),
            ],
            validators: vec![
                Box::new(DeleteWholeConfigMoveValidator),
                Box::new(UniqueLanesMoveValidator),
                Box::new(CreateOnlyMoveValidator),
                Box::new(NoDependencyMoveValidator),
                Box::new(NoEmptyTableMoveValidator),
                Box::new(FullConfigMoveValidator),
            ],
        }
    }

    /// Builds a wrapper with a caller-chosen set of extenders/validators,
    /// e.g. for tests that only want to exercise one validator in
    /// isolation.
    #[must_use]
    pub fn new(
        extenders: Vec<Box<dyn MoveExtender + Send + Sync>>,
        validators: Vec<Box<dyn MoveValidator + Send + Sync>>,
    ) -> Self {
        Self { extenders, validators }
    }

    /// Every candidate move reachable from `diff`: the generator's
    /// low-level moves, plus every extension of every move already found,
    /// run to a fixpoint and deduplicated.
    #[must_use]
    pub fn candidate_moves(&self, diff: &Diff, oracle: &dyn SchemaOracle) -> Vec<JsonMove> {
        let mut seen: HashSet<JsonMove> = HashSet::new();
        let mut frontier = low_level_moves(diff);
        let mut out = Vec::new();

        while let Some(mv) = frontier.pop() {
            if !seen.insert(mv.clone()) {
                continue;
            }
            for extender in &self.extenders {
                for extended in extender.extend(&mv, diff, oracle) {
                    if !seen.contains(&extended) {
                        frontier.push(extended);
                    }
                }
            }
            out.push(mv);
        }
        out
    }

    /// `true` if every validator accepts `mv` against `diff`.
    ///
    /// A candidate whose simulation turns out to be structurally
    /// inapplicable (e.g. an array-index `add` the generator proposed
    /// speculatively, before an earlier sibling index has actually been
    /// inserted) is just a dead branch, exactly like a validator saying no:
    /// [`SorterError::PatchApplication`] from a validator's simulation is
    /// swallowed here rather than aborting the whole search.
    ///
    /// # Errors
    /// Propagates any other validator failure, in particular
    /// [`SorterError::InternalInvariant`], which indicates a genuine
    /// generator/extender bug rather than a speculative candidate.
    pub fn is_valid(&self, mv: &JsonMove, diff: &Diff, oracle: &dyn SchemaOracle) -> Result<bool, SorterError> {
        for validator in &self.validators {
            match validator.validate(mv, diff, oracle) {
                Ok(true) => {}
                Ok(false) => {
                    trace!(validator = validator.name(), path = %mv.current_path(), "move rejected");
                    return Ok(false);
                }
                Err(SorterError::PatchApplication(e)) => {
                    trace!(validator = validator.name(), path = %mv.current_path(), error = %e, "move inapplicable");
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    /// The valid successor diffs reachable from `diff` in one step, paired
    /// with the move that produced each one.
    ///
    /// # Errors
    /// Propagates any error from generating candidates or simulating a move.
    pub fn valid_successors(&self, diff: &Diff, oracle: &dyn SchemaOracle) -> Result<Vec<(JsonMove, Diff)>, SorterError> {
        let mut out = Vec::new();
        for mv in self.candidate_moves(diff, oracle) {
            if self.is_valid(&mv, diff, oracle)? {
                let next = diff.apply_move(&mv)?;
                out.push((mv, next));
            }
        }
        Ok(out)
    }
}

impl Default for MoveWrapper {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for MoveWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveWrapper")
            .field("extenders", &self.extenders.len())
            .field("validators", &self.validators.len())
            .finish()
    }
}
