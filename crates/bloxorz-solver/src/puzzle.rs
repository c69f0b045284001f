//! Puzzle representation types that match the JSON puzzle format.
//!
//! These types deserialize directly from the puzzle files and are turned into
//! a validated [`Board`](crate::board::Board) by the loader. Nothing here is
//! checked for consistency; that happens in `Board::from_config`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Grid coordinate. Field order gives the derived `Ord` row-major ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Coordinate one step away in `direction`
    pub fn step(self, direction: Direction) -> Coord {
        let (dr, dc) = direction.delta();
        Coord::new(self.row + dr, self.col + dc)
    }

    /// Coordinate `n` steps away in `direction`
    pub fn offset(self, direction: Direction, n: i32) -> Coord {
        let (dr, dc) = direction.delta();
        Coord::new(self.row + dr * n, self.col + dc * n)
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Coord::new(row as i32, col as i32)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Direction of a move. Rows grow downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Right,
    Up,
    Left,
}

impl Direction {
    /// All directions in the order moves are generated
    pub const ALL: [Direction; 4] = [
        Direction::Down,
        Direction::Right,
        Direction::Up,
        Direction::Left,
    ];

    /// (row delta, column delta)
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Down => (1, 0),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Left => (0, -1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Down => "down",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Left => "left",
        };
        f.write_str(name)
    }
}

/// What a switch does to one bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeAction {
    On,
    Off,
    Swap,
}

impl BridgeAction {
    /// New enabled flag after applying this action to `enabled`
    pub fn apply(self, enabled: bool) -> bool {
        match self {
            BridgeAction::On => true,
            BridgeAction::Off => false,
            BridgeAction::Swap => !enabled,
        }
    }
}

/// Pressure switch flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchKind {
    /// `X`: fires only when the block lands vertically on it
    Full,
    /// `O`: fires whenever a part of the block newly lands on it
    Half,
}

/// `[row, col, [[bridge_index, action], ...]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig(pub usize, pub usize, pub Vec<(usize, BridgeAction)>);

impl SwitchConfig {
    pub fn location(&self) -> (usize, usize) {
        (self.0, self.1)
    }

    pub fn actions(&self) -> &[(usize, BridgeAction)] {
        &self.2
    }
}

/// `[row, col, r1, c1, r2, c2]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleportConfig(
    pub usize,
    pub usize,
    pub usize,
    pub usize,
    pub usize,
    pub usize,
);

impl TeleportConfig {
    pub fn location(&self) -> (usize, usize) {
        (self.0, self.1)
    }

    pub fn targets(&self) -> ((usize, usize), (usize, usize)) {
        ((self.2, self.3), (self.4, self.5))
    }
}

/// The complete puzzle description as found in a puzzle file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub name: String,
    #[serde(default)]
    pub passcode: String,
    pub grid: Vec<String>,
    /// Each bridge is a list of `[row, col]` cells
    #[serde(default)]
    pub bridges: Vec<Vec<(usize, usize)>>,
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
    #[serde(default)]
    pub teleports: Vec<TeleportConfig>,
}

/// A puzzle file holds either a single puzzle or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PuzzleFile {
    Many(Vec<PuzzleConfig>),
    One(Box<PuzzleConfig>),
}

/// Parse the contents of a puzzle file
pub fn parse_puzzles(json: &str) -> serde_json::Result<Vec<PuzzleConfig>> {
    let file: PuzzleFile = serde_json::from_str(json)?;
    Ok(match file {
        PuzzleFile::Many(puzzles) => puzzles,
        PuzzleFile::One(puzzle) => vec![*puzzle],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_ordering_is_row_major() {
        assert!(Coord::new(0, 5) < Coord::new(1, 0));
        assert!(Coord::new(2, 1) < Coord::new(2, 3));
        assert_eq!(Coord::new(3, 3).cmp(&Coord::new(3, 3)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_coord_steps() {
        let c = Coord::new(2, 2);
        assert_eq!(c.step(Direction::Down), Coord::new(3, 2));
        assert_eq!(c.step(Direction::Left), Coord::new(2, 1));
        assert_eq!(c.offset(Direction::Up, 2), Coord::new(0, 2));
    }

    #[test]
    fn test_bridge_action_truth_table() {
        for enabled in [false, true] {
            assert!(BridgeAction::On.apply(enabled));
            assert!(!BridgeAction::Off.apply(enabled));
            assert_eq!(BridgeAction::Swap.apply(enabled), !enabled);
        }
    }

    #[test]
    fn test_parse_single_and_list() {
        let single = r#"{"name": "a", "grid": ["S.H"]}"#;
        let puzzles = parse_puzzles(single).unwrap();
        assert_eq!(puzzles.len(), 1);
        assert_eq!(puzzles[0].passcode, "");
        assert!(puzzles[0].bridges.is_empty());

        let list = r#"[
            {"name": "a", "grid": ["S.H"]},
            {
                "name": "b",
                "passcode": "123456",
                "grid": ["S.bO.H"],
                "bridges": [[[0, 2]]],
                "switches": [[0, 3, [[0, "swap"], [0, "on"]]]],
                "teleports": []
            }
        ]"#;
        let puzzles = parse_puzzles(list).unwrap();
        assert_eq!(puzzles.len(), 2);
        assert_eq!(puzzles[1].passcode, "123456");
        assert_eq!(puzzles[1].bridges, vec![vec![(0, 2)]]);
        assert_eq!(puzzles[1].switches[0].location(), (0, 3));
        assert_eq!(
            puzzles[1].switches[0].actions(),
            &[(0, BridgeAction::Swap), (0, BridgeAction::On)]
        );
    }

    #[test]
    fn test_parse_teleport() {
        let json = r#"{"name": "t", "grid": ["S.T"], "teleports": [[0, 2, 0, 0, 0, 1]]}"#;
        let puzzles = parse_puzzles(json).unwrap();
        let teleport = puzzles[0].teleports[0];
        assert_eq!(teleport.location(), (0, 2));
        assert_eq!(teleport.targets(), ((0, 0), (0, 1)));
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        let json = r#"{"name": "x", "grid": ["SOH"], "switches": [[0, 1, [[0, "toggle"]]]]}"#;
        assert!(parse_puzzles(json).is_err());
    }
}
