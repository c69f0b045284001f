//! Search state: where the block is and which bridges are enabled.
//!
//! Both halves of the block are tracked as a canonical pair of coordinates,
//! and the bridge configuration is packed into 64-bit words so states stay
//! cheap to hash and clone.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use crate::puzzle::{BridgeAction, Coord};

/// Shape of the block, derived from its two coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Standing on a single cell
    Vertical,
    /// Lying across two cells of one row
    Row,
    /// Lying across two cells of one column
    Column,
    /// Two independent halves on non-adjacent cells
    Split,
}

/// Position of both block halves, with `first <= second` in row-major order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BlockPosition {
    first: Coord,
    second: Coord,
}

impl BlockPosition {
    /// Build a position from two coordinates given in any order
    pub fn new(a: Coord, b: Coord) -> Self {
        if b < a {
            Self { first: b, second: a }
        } else {
            Self { first: a, second: b }
        }
    }

    /// Block standing upright on `at`
    pub fn vertical(at: Coord) -> Self {
        Self { first: at, second: at }
    }

    pub fn first(&self) -> Coord {
        self.first
    }

    pub fn second(&self) -> Coord {
        self.second
    }

    pub fn shape(&self) -> Shape {
        let (a, b) = (self.first, self.second);
        if a == b {
            Shape::Vertical
        } else if a.row == b.row && a.col + 1 == b.col {
            Shape::Row
        } else if a.col == b.col && a.row + 1 == b.row {
            Shape::Column
        } else {
            Shape::Split
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.first == self.second
    }

    pub fn is_vertical_at(&self, at: Coord) -> bool {
        self.first == at && self.second == at
    }

    /// True when either half rests on `at`
    pub fn occupies(&self, at: Coord) -> bool {
        self.first == at || self.second == at
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_vertical() {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.second)
        }
    }
}

const WORD_BITS: usize = 64;

/// Enabled flag of every bridge group, indexed by bridge id.
///
/// Values are never shared between states: every transition that changes a
/// bridge produces a fresh vector through [`BridgeVector::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BridgeVector {
    len: usize,
    words: SmallVec<[u64; 1]>,
}

impl BridgeVector {
    /// `len` bridges, all disabled
    pub fn new(len: usize) -> Self {
        let words = SmallVec::from_elem(0, len.div_ceil(WORD_BITS));
        Self { len, words }
    }

    pub fn from_bools<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        let flags: Vec<bool> = flags.into_iter().collect();
        let mut vector = Self::new(flags.len());
        for (index, enabled) in flags.into_iter().enumerate() {
            vector.set(index, enabled);
        }
        vector
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bridge {index} out of range ({})", self.len);
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    fn set(&mut self, index: usize, enabled: bool) {
        assert!(index < self.len, "bridge {index} out of range ({})", self.len);
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if enabled {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Copy of this vector with `actions` applied one after another
    pub fn apply<'a, I>(&self, actions: I) -> BridgeVector
    where
        I: IntoIterator<Item = &'a (usize, BridgeAction)>,
    {
        let mut next = self.clone();
        for &(bridge, action) in actions {
            let enabled = action.apply(next.get(bridge));
            next.set(bridge, enabled);
        }
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| self.get(i))
    }
}

impl fmt::Display for BridgeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for enabled in self.iter() {
            f.write_str(if enabled { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl Serialize for BridgeVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// One vertex of the search graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchState {
    pub position: BlockPosition,
    pub bridges: BridgeVector,
}

impl SearchState {
    pub fn new(position: BlockPosition, bridges: BridgeVector) -> Self {
        Self { position, bridges }
    }

    /// Solved when standing upright on the goal, whatever the bridges are doing
    pub fn is_solved(&self, goal: Coord) -> bool {
        self.position.is_vertical_at(goal)
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bridges.is_empty() {
            write!(f, "{}", self.position)
        } else {
            write!(f, "{} bridges={}", self.position, self.bridges)
        }
    }
}
