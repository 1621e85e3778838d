//! The three search strategies [`AlgorithmKind`](crate::AlgorithmKind)
//! selects between. All three explore the same graph — nodes are [`Diff`]s,
//! edges are validated [`JsonMove`]s — and are sound and complete up to
//! `max_nodes`; they differ only in traversal order and memory use.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, instrument, warn};

use crate::diff::Diff;
use crate::hash::HashCode;
use crate::json_move::JsonMove;
use crate::move_wrapper::MoveWrapper;
use crate::options::{AlgorithmKind, SorterOptions};
use crate::schema::SchemaOracle;
use crate::SorterError;

/// Searches from `start` for a sequence of moves reaching the goal state
/// (`current == target`), dispatching to the strategy named by
/// `options.algorithm()`.
///
/// # Errors
/// [`SorterError::NoValidOrdering`] if the state space (bounded by
/// `options.max_nodes()`) is exhausted without reaching the goal.
#[instrument(skip(wrapper, oracle), fields(algorithm = %options.algorithm(), start_hash = ?start.hash_code()))]
pub fn search(
    start: &Diff,
    wrapper: &MoveWrapper,
    oracle: &dyn SchemaOracle,
    options: &SorterOptions,
) -> Result<Vec<JsonMove>, SorterError> {
    if start.is_goal() {
        return Ok(Vec::new());
    }
    let result = match options.algorithm() {
        AlgorithmKind::Dfs => dfs(start, wrapper, oracle, options.max_nodes()),
        AlgorithmKind::Bfs => bfs(start, wrapper, oracle, options.max_nodes()),
        AlgorithmKind::Memoization => memoized_dfs(start, wrapper, oracle, options.max_nodes()),
    };
    if result.is_err() {
        warn!("search exhausted without reaching the target");
    }
    result
}

fn dfs(start: &Diff, wrapper: &MoveWrapper, oracle: &dyn SchemaOracle, max_nodes: usize) -> Result<Vec<JsonMove>, SorterError> {
    let mut visited: HashSet<HashCode> = HashSet::new();
    let mut path = Vec::new();
    if dfs_step(start, wrapper, oracle, max_nodes, &mut visited, &mut path)? {
        Ok(path)
    } else {
        Err(SorterError::NoValidOrdering)
    }
}

fn dfs_step(
    diff: &Diff,
    wrapper: &MoveWrapper,
    oracle: &dyn SchemaOracle,
    max_nodes: usize,
    visited: &mut HashSet<HashCode>,
    path: &mut Vec<JsonMove>,
) -> Result<bool, SorterError> {
    if diff.is_goal() {
        return Ok(true);
    }
    if visited.len() >= max_nodes || !visited.insert(diff.hash_code()) {
        return Ok(false);
    }
    debug!(visited = visited.len(), depth = path.len(), "visiting node");
    for (mv, next) in wrapper.valid_successors(diff, oracle)? {
        path.push(mv);
        if dfs_step(&next, wrapper, oracle, max_nodes, visited, path)? {
            return Ok(true);
        }
        path.pop();
    }
    Ok(false)
}

fn bfs(start: &Diff, wrapper: &MoveWrapper, oracle: &dyn SchemaOracle, max_nodes: usize) -> Result<Vec<JsonMove>, SorterError> {
    let mut visited: HashSet<HashCode> = HashSet::new();
    visited.insert(start.hash_code());
    // Each queue entry carries the full path that reached it; BFS trades
    // memory for guaranteeing the shortest move sequence is returned first.
    let mut queue: VecDeque<(Diff, Vec<JsonMove>)> = VecDeque::new();
    queue.push_back((start.clone(), Vec::new()));

    while let Some((diff, path)) = queue.pop_front() {
        if visited.len() >= max_nodes {
            break;
        }
        debug!(visited = visited.len(), depth = path.len(), "visiting node");
        for (mv, next) in wrapper.valid_successors(&diff, oracle)? {
            if next.is_goal() {
                let mut full = path.clone();
                full.push(mv);
                return Ok(full);
            }
            if visited.insert(next.hash_code()) {
                let mut full = path.clone();
                full.push(mv);
                queue.push_back((next, full));
            }
        }
    }
    Err(SorterError::NoValidOrdering)
}

fn memoized_dfs(start: &Diff, wrapper: &MoveWrapper, oracle: &dyn SchemaOracle, max_nodes: usize) -> Result<Vec<JsonMove>, SorterError> {
    // `None` marks a diff already proven to be a dead end, so siblings that
    // reach the same node (e.g. two different orderings of two independent
    // field edits) don't re-explore it.
    let mut memo: std::collections::HashMap<HashCode, bool> = std::collections::HashMap::new();
    let mut path = Vec::new();
    let mut visits = 0usize;
    if memoized_step(start, wrapper, oracle, max_nodes, &mut memo, &mut visits, &mut path)? {
        Ok(path)
    } else {
        Err(SorterError::NoValidOrdering)
    }
}

fn memoized_step(
    diff: &Diff,
    wrapper: &MoveWrapper,
    oracle: &dyn SchemaOracle,
    max_nodes: usize,
    memo: &mut std::collections::HashMap<HashCode, bool>,
    visits: &mut usize,
    path: &mut Vec<JsonMove>,
) -> Result<bool, SorterError> {
    if diff.is_goal() {
        return Ok(true);
    }
    let key = diff.hash_code();
    if let Some(&known) = memo.get(&key) {
        return Ok(known);
    }
    if *visits >= max_nodes {
        return Ok(false);
    }
    *visits += 1;
    debug!(visited = *visits, depth = path.len(), "visiting node");

    for (mv, next) in wrapper.valid_successors(diff, oracle)? {
        path.push(mv);
        if memoized_step(&next, wrapper, oracle, max_nodes, memo, visits, path)? {
            memo.insert(key, true);
            return Ok(true);
        }
        path.pop();
    }
    memo.insert(key, false);
    Ok(false)
}
