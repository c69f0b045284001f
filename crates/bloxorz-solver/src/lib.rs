//! Shortest-move solver for Bloxorz block puzzles.
//!
//! A puzzle description is validated into a [`Board`], and [`solve`] runs a
//! breadth-first search over (block position, bridge configuration) states
//! to find a shortest move sequence that stands the block upright on the goal.

pub mod board;
pub mod moves;
pub mod puzzle;
pub mod solver;
pub mod state;

// Re-export main types
pub use board::{Board, BridgeGroup, Cell, LoadError, Switch, Teleport};
pub use moves::{candidates, successors, Move, Piece};
pub use puzzle::{
    parse_puzzles, BridgeAction, Coord, Direction, PuzzleConfig, SwitchConfig, SwitchKind,
    TeleportConfig,
};
pub use solver::{solve, NoSolutionFound, SearchStats, Solution};
pub use state::{BlockPosition, BridgeVector, SearchState, Shape};
