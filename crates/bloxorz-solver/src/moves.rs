//! Transition generator: every legal move out of a search state.
//!
//! Candidates are produced in a fixed order (down, right, up, left, and for a
//! split block the first half before the second) so that the search picks the
//! same shortest path every time.

use log::trace;
use serde::Serialize;
use smallvec::SmallVec;

use crate::board::{Board, Cell};
use crate::puzzle::{BridgeAction, Direction, SwitchKind};
use crate::state::{BlockPosition, SearchState, Shape};

/// Which part of the block a move pushes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    /// The whole block rolls
    Block,
    /// Only the first half of a split block slides
    First,
    /// Only the second half of a split block slides
    Second,
}

/// A single move, as shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub direction: Direction,
    pub piece: Piece,
}

impl Move {
    pub fn roll(direction: Direction) -> Self {
        Self {
            direction,
            piece: Piece::Block,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.piece {
            Piece::Block => write!(f, "{}", self.direction),
            Piece::First => write!(f, "first half {}", self.direction),
            Piece::Second => write!(f, "second half {}", self.direction),
        }
    }
}

/// A split block has 8 candidates, a whole block 4
pub type Successors = SmallVec<[(Move, SearchState); 8]>;

/// Raw destinations reachable from `position`, before any landing rule
pub fn candidates(position: &BlockPosition) -> SmallVec<[(Move, BlockPosition); 8]> {
    let (a, b) = (position.first(), position.second());
    let mut out = SmallVec::new();

    match position.shape() {
        Shape::Vertical => {
            for direction in Direction::ALL {
                let to = BlockPosition::new(a.offset(direction, 1), a.offset(direction, 2));
                out.push((Move::roll(direction), to));
            }
        }
        Shape::Row | Shape::Column => {
            let along = if position.shape() == Shape::Row {
                [Direction::Right, Direction::Left]
            } else {
                [Direction::Down, Direction::Up]
            };
            for direction in Direction::ALL {
                let to = if direction == along[0] {
                    BlockPosition::vertical(b.step(direction))
                } else if direction == along[1] {
                    BlockPosition::vertical(a.step(direction))
                } else {
                    BlockPosition::new(a.step(direction), b.step(direction))
                };
                out.push((Move::roll(direction), to));
            }
        }
        Shape::Split => {
            for direction in Direction::ALL {
                let first = Move {
                    direction,
                    piece: Piece::First,
                };
                let second = Move {
                    direction,
                    piece: Piece::Second,
                };
                out.push((first, BlockPosition::new(a.step(direction), b)));
                out.push((second, BlockPosition::new(a, b.step(direction))));
            }
        }
    }

    out
}

/// All successors of `state`. Candidates that roll off the grid, fall through
/// an empty cell or disabled bridge, or stand upright on orange are dropped.
pub fn successors(board: &Board, state: &SearchState) -> Successors {
    candidates(&state.position)
        .into_iter()
        .filter_map(|(step, to)| land(board, state, to).map(|next| (step, next)))
        .collect()
}

/// Apply the landing rules to one candidate position
fn land(board: &Board, from: &SearchState, to: BlockPosition) -> Option<SearchState> {
    let (a, b) = (to.first(), to.second());
    if !board.contains(a) || !board.contains(b) {
        return None;
    }

    let cells = [(a, board.cell_at(a)), (b, board.cell_at(b))];
    for (_, cell) in cells {
        match cell {
            Cell::Empty => return None,
            Cell::Bridge(bridge) if !from.bridges.get(bridge) => return None,
            _ => {}
        }
    }

    let mut landed = to;
    let mut fired: SmallVec<[&[(usize, BridgeAction)]; 2]> = SmallVec::new();

    if to.is_vertical() {
        match cells[0].1 {
            Cell::Orange => return None,
            Cell::Teleport(index) => {
                let (t1, t2) = board.teleports()[index].targets;
                landed = BlockPosition::new(t1, t2);
                trace!("teleport at {a} sends block to {landed}");
            }
            Cell::Switch(index) => {
                trace!("switch at {a} pressed upright");
                fired.push(board.switches()[index].actions.as_slice());
            }
            _ => {}
        }
    } else {
        for (at, cell) in cells {
            if let Cell::Switch(index) = cell {
                let switch = &board.switches()[index];
                if switch.kind == SwitchKind::Half && !from.position.occupies(at) {
                    trace!("half switch at {at} pressed");
                    fired.push(switch.actions.as_slice());
                }
            }
        }
    }

    let bridges = if fired.is_empty() {
        from.bridges.clone()
    } else {
        from.bridges.apply(fired.into_iter().flatten())
    };
    Some(SearchState::new(landed, bridges))
}
