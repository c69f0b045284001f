//! Breadth-first search for the shortest move sequence.
//!
//! The search expands one layer (one move count) at a time and stops as soon
//! as a successor stands upright on the goal. Each call owns its own visited
//! set and predecessor map, so a board can be solved repeatedly.

use std::time::Instant;

use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use thiserror::Error;

use crate::board::Board;
use crate::moves::{successors, Move};
use crate::state::SearchState;

/// Counters collected while searching
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Distinct states reached, including the start
    pub states_visited: usize,
    /// Layers expanded
    pub layers: usize,
    /// Successors produced by the transition generator
    pub successors_generated: usize,
    pub time_elapsed_ms: u64,
}

/// The reachable states contain no solved state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no solution ({} states explored in {} layers)", .stats.states_visited, .stats.layers)]
pub struct NoSolutionFound {
    pub stats: SearchStats,
}

/// A shortest solution
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    /// Every state from start to goal, both included
    pub states: Vec<SearchState>,
    /// `moves[i]` leads from `states[i]` to `states[i + 1]`
    pub moves: Vec<Move>,
    pub stats: SearchStats,
}

impl Solution {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

/// Predecessor link; `None` marks the start state
type Parents = FxHashMap<SearchState, Option<(SearchState, Move)>>;

/// Find a shortest move sequence from the start to the goal
pub fn solve(board: &Board) -> Result<Solution, NoSolutionFound> {
    let start_time = Instant::now();
    let goal = board.goal();
    let start = board.start_state();

    let mut stats = SearchStats::default();
    let mut visited: FxHashSet<SearchState> = FxHashSet::default();
    let mut parents: Parents = FxHashMap::default();
    visited.insert(start.clone());
    parents.insert(start.clone(), None);
    stats.states_visited = 1;

    if start.is_solved(goal) {
        stats.time_elapsed_ms = start_time.elapsed().as_millis() as u64;
        return Ok(reconstruct(&parents, start, stats));
    }

    let mut frontier = vec![start];

    while !frontier.is_empty() {
        stats.layers += 1;
        let mut next_frontier = Vec::new();

        for state in &frontier {
            let next = successors(board, state);
            stats.successors_generated += next.len();

            for (step, successor) in next {
                if successor.is_solved(goal) {
                    parents.insert(successor.clone(), Some((state.clone(), step)));
                    stats.states_visited += 1;
                    stats.time_elapsed_ms = start_time.elapsed().as_millis() as u64;
                    info!(
                        "{}: solved in {} moves after {} states",
                        board.name(),
                        stats.layers,
                        stats.states_visited
                    );
                    return Ok(reconstruct(&parents, successor, stats));
                }
                if visited.contains(&successor) {
                    continue;
                }
                visited.insert(successor.clone());
                parents.insert(successor.clone(), Some((state.clone(), step)));
                next_frontier.push(successor);
            }
        }

        stats.states_visited += next_frontier.len();
        debug!(
            "layer {}: {} new states, {} visited",
            stats.layers,
            next_frontier.len(),
            stats.states_visited
        );
        frontier = next_frontier;
    }

    stats.time_elapsed_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "{}: no solution, {} states exhausted",
        board.name(),
        stats.states_visited
    );
    Err(NoSolutionFound { stats })
}

/// Walk the predecessor chain back from `last` to the start
fn reconstruct(parents: &Parents, last: SearchState, stats: SearchStats) -> Solution {
    let mut states = vec![last];
    let mut moves = Vec::new();

    while let Some(Some((previous, step))) = parents.get(&states[states.len() - 1]) {
        moves.push(*step);
        states.push(previous.clone());
    }

    states.reverse();
    moves.reverse();
    Solution {
        states,
        moves,
        stats,
    }
}
