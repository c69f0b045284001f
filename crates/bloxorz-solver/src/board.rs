//! Static board model and the loader that validates a [`PuzzleConfig`] into it.
//!
//! A [`Board`] is immutable once built. The search engine only ever reads it,
//! so one board can be solved any number of times.

use std::fmt;

use thiserror::Error;

use crate::puzzle::{BridgeAction, Coord, PuzzleConfig, SwitchKind};
use crate::state::{BlockPosition, BridgeVector, SearchState};

const EMPTY: char = ' ';
const GRAY: char = '.';
const ORANGE: char = '-';
const START: char = 'S';
const GOAL: char = 'H';
const FULL_SWITCH: char = 'X';
const HALF_SWITCH: char = 'O';
const BRIDGE_ON: char = 'B';
const BRIDGE_OFF: char = 'b';
const TELEPORT: char = 'T';
const BLOCK: char = '#';

/// A single grid cell. Indexes point into the board's bridge, switch and
/// teleport tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Gray,
    Orange,
    Bridge(usize),
    Switch(usize),
    Teleport(usize),
}

/// Cells sharing one enabled flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeGroup {
    pub cells: Vec<Coord>,
    pub initially_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub location: Coord,
    pub kind: SwitchKind,
    pub actions: Vec<(usize, BridgeAction)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teleport {
    pub location: Coord,
    pub targets: (Coord, Coord),
}

/// Reasons a puzzle description cannot be turned into a board
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("grid is empty")]
    EmptyGrid,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown symbol {symbol:?} at ({row},{col})")]
    UnknownSymbol { symbol: char, row: usize, col: usize },
    #[error("no start cell")]
    MissingStart,
    #[error("second start cell at ({row},{col})")]
    DuplicateStart { row: usize, col: usize },
    #[error("no goal cell")]
    MissingGoal,
    #[error("second goal cell at ({row},{col})")]
    DuplicateGoal { row: usize, col: usize },
    #[error("bridge {bridge} has no cells")]
    EmptyBridge { bridge: usize },
    #[error("bridge {bridge} cell ({row},{col}) is outside the grid")]
    BridgeOutOfBounds { bridge: usize, row: usize, col: usize },
    #[error("bridge {bridge} cell ({row},{col}) is not a bridge symbol")]
    NotABridgeCell { bridge: usize, row: usize, col: usize },
    #[error("bridge {bridge} mixes enabled and disabled cells at ({row},{col})")]
    MixedBridge { bridge: usize, row: usize, col: usize },
    #[error("bridge {bridge} reuses cell ({row},{col})")]
    SharedBridgeCell { bridge: usize, row: usize, col: usize },
    #[error("bridge cell ({row},{col}) belongs to no bridge")]
    UnreferencedBridgeCell { row: usize, col: usize },
    #[error("switch entry at ({row},{col}) is not on a switch cell")]
    NotASwitchCell { row: usize, col: usize },
    #[error("more than one switch entry for ({row},{col})")]
    DuplicateSwitch { row: usize, col: usize },
    #[error("switch at ({row},{col}) refers to unknown bridge {bridge}")]
    UnknownBridge { row: usize, col: usize, bridge: usize },
    #[error("{entries} switch entries for {cells} switch cells")]
    SwitchCountMismatch { entries: usize, cells: usize },
    #[error("teleport entry at ({row},{col}) is not on a teleport cell")]
    NotATeleportCell { row: usize, col: usize },
    #[error("more than one teleport entry for ({row},{col})")]
    DuplicateTeleport { row: usize, col: usize },
    #[error("teleport at ({row},{col}) targets a cell outside the grid")]
    TeleportOutOfBounds { row: usize, col: usize },
    #[error("{entries} teleport entries for {cells} teleport cells")]
    TeleportCountMismatch { entries: usize, cells: usize },
}

/// The validated puzzle: grid, mechanics, start and goal
#[derive(Debug, Clone)]
pub struct Board {
    name: String,
    passcode: String,
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    bridges: Vec<BridgeGroup>,
    switches: Vec<Switch>,
    teleports: Vec<Teleport>,
    start: Coord,
    goal: Coord,
}

impl Board {
    /// Validate a puzzle description and build the board
    pub fn from_config(config: &PuzzleConfig) -> Result<Board, LoadError> {
        let symbols = read_grid(&config.grid)?;
        let rows = symbols.len();
        let cols = symbols[0].len();
        let in_grid = |row: usize, col: usize| row < rows && col < cols;

        // None marks cells still waiting for a bridge, switch or teleport entry
        let mut cells: Vec<Option<Cell>> = Vec::with_capacity(rows * cols);
        let mut start = None;
        let mut goal = None;
        let mut switch_cells = 0;
        let mut teleport_cells = 0;

        for (row, line) in symbols.iter().enumerate() {
            for (col, &symbol) in line.iter().enumerate() {
                let cell = match symbol {
                    EMPTY => Some(Cell::Empty),
                    GRAY => Some(Cell::Gray),
                    ORANGE => Some(Cell::Orange),
                    START => {
                        if start.is_some() {
                            return Err(LoadError::DuplicateStart { row, col });
                        }
                        start = Some(Coord::from((row, col)));
                        Some(Cell::Gray)
                    }
                    GOAL => {
                        if goal.is_some() {
                            return Err(LoadError::DuplicateGoal { row, col });
                        }
                        goal = Some(Coord::from((row, col)));
                        Some(Cell::Gray)
                    }
                    FULL_SWITCH | HALF_SWITCH => {
                        switch_cells += 1;
                        None
                    }
                    TELEPORT => {
                        teleport_cells += 1;
                        None
                    }
                    BRIDGE_ON | BRIDGE_OFF => None,
                    symbol => return Err(LoadError::UnknownSymbol { symbol, row, col }),
                };
                cells.push(cell);
            }
        }

        let start = start.ok_or(LoadError::MissingStart)?;
        let goal = goal.ok_or(LoadError::MissingGoal)?;

        let mut bridges = Vec::with_capacity(config.bridges.len());
        for (bridge, group) in config.bridges.iter().enumerate() {
            let &(first_row, first_col) = group.first().ok_or(LoadError::EmptyBridge { bridge })?;
            let initial_symbol = if in_grid(first_row, first_col) {
                symbols[first_row][first_col]
            } else {
                BRIDGE_ON
            };
            let mut group_cells = Vec::with_capacity(group.len());
            for &(row, col) in group {
                if !in_grid(row, col) {
                    return Err(LoadError::BridgeOutOfBounds { bridge, row, col });
                }
                let symbol = symbols[row][col];
                if symbol != BRIDGE_ON && symbol != BRIDGE_OFF {
                    return Err(LoadError::NotABridgeCell { bridge, row, col });
                }
                if symbol != initial_symbol {
                    return Err(LoadError::MixedBridge { bridge, row, col });
                }
                let slot = &mut cells[row * cols + col];
                if slot.is_some() {
                    return Err(LoadError::SharedBridgeCell { bridge, row, col });
                }
                *slot = Some(Cell::Bridge(bridge));
                group_cells.push(Coord::from((row, col)));
            }
            bridges.push(BridgeGroup {
                cells: group_cells,
                initially_enabled: initial_symbol == BRIDGE_ON,
            });
        }

        let mut switches = Vec::with_capacity(config.switches.len());
        for entry in &config.switches {
            let (row, col) = entry.location();
            let kind = match in_grid(row, col).then(|| symbols[row][col]) {
                Some(FULL_SWITCH) => SwitchKind::Full,
                Some(HALF_SWITCH) => SwitchKind::Half,
                _ => return Err(LoadError::NotASwitchCell { row, col }),
            };
            if let Some(&(bridge, _)) = entry.actions().iter().find(|(b, _)| *b >= bridges.len()) {
                return Err(LoadError::UnknownBridge { row, col, bridge });
            }
            let slot = &mut cells[row * cols + col];
            if slot.is_some() {
                return Err(LoadError::DuplicateSwitch { row, col });
            }
            *slot = Some(Cell::Switch(switches.len()));
            switches.push(Switch {
                location: Coord::from((row, col)),
                kind,
                actions: entry.actions().to_vec(),
            });
        }
        if switches.len() != switch_cells {
            return Err(LoadError::SwitchCountMismatch {
                entries: switches.len(),
                cells: switch_cells,
            });
        }

        let mut teleports = Vec::with_capacity(config.teleports.len());
        for entry in &config.teleports {
            let (row, col) = entry.location();
            if !in_grid(row, col) || symbols[row][col] != TELEPORT {
                return Err(LoadError::NotATeleportCell { row, col });
            }
            let (a, b) = entry.targets();
            if !in_grid(a.0, a.1) || !in_grid(b.0, b.1) {
                return Err(LoadError::TeleportOutOfBounds { row, col });
            }
            let slot = &mut cells[row * cols + col];
            if slot.is_some() {
                return Err(LoadError::DuplicateTeleport { row, col });
            }
            *slot = Some(Cell::Teleport(teleports.len()));
            teleports.push(Teleport {
                location: Coord::from((row, col)),
                targets: (Coord::from(a), Coord::from(b)),
            });
        }
        if teleports.len() != teleport_cells {
            return Err(LoadError::TeleportCountMismatch {
                entries: teleports.len(),
                cells: teleport_cells,
            });
        }

        // Switch and teleport cells are all filled by now, leftovers are bridges
        let cells = cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| {
                cell.ok_or(LoadError::UnreferencedBridgeCell {
                    row: index / cols,
                    col: index % cols,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Board {
            name: config.name.clone(),
            passcode: config.passcode.clone(),
            rows,
            cols,
            cells,
            bridges,
            switches,
            teleports,
            start,
            goal,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passcode(&self) -> &str {
        &self.passcode
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.row >= 0 && at.col >= 0 && (at.row as usize) < self.rows && (at.col as usize) < self.cols
    }

    /// Cell at `at`; anything outside the grid reads as empty
    pub fn cell_at(&self, at: Coord) -> Cell {
        if self.contains(at) {
            self.cells[at.row as usize * self.cols + at.col as usize]
        } else {
            Cell::Empty
        }
    }

    pub fn bridge_of(&self, at: Coord) -> Option<usize> {
        match self.cell_at(at) {
            Cell::Bridge(bridge) => Some(bridge),
            _ => None,
        }
    }

    pub fn switch_at(&self, at: Coord) -> Option<&Switch> {
        match self.cell_at(at) {
            Cell::Switch(index) => Some(&self.switches[index]),
            _ => None,
        }
    }

    /// Actions fired by the switch at `at` (empty if there is none)
    pub fn switch_actions(&self, at: Coord) -> &[(usize, BridgeAction)] {
        match self.switch_at(at) {
            Some(switch) => &switch.actions,
            None => &[],
        }
    }

    pub fn switch_kind(&self, at: Coord) -> Option<SwitchKind> {
        self.switch_at(at).map(|s| s.kind)
    }

    pub fn teleport_target(&self, at: Coord) -> Option<(Coord, Coord)> {
        match self.cell_at(at) {
            Cell::Teleport(index) => Some(self.teleports[index].targets),
            _ => None,
        }
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn goal(&self) -> Coord {
        self.goal
    }

    pub fn bridges(&self) -> &[BridgeGroup] {
        &self.bridges
    }

    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    pub fn teleports(&self) -> &[Teleport] {
        &self.teleports
    }

    pub fn bridge_count(&self) -> usize {
        self.bridges.len()
    }

    pub fn initial_bridges(&self) -> BridgeVector {
        BridgeVector::from_bools(self.bridges.iter().map(|b| b.initially_enabled))
    }

    /// Block upright on the start cell with the initial bridge configuration
    pub fn start_state(&self) -> SearchState {
        SearchState::new(BlockPosition::vertical(self.start), self.initial_bridges())
    }

    /// Draw the grid with the bridges as they are in `state` and the block on top
    pub fn render(&self, state: &SearchState) -> String {
        self.draw(Some(state), &state.bridges)
    }

    fn draw(&self, state: Option<&SearchState>, bridges: &BridgeVector) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let at = Coord::from((row, col));
                out.push(self.symbol_at(at, state, bridges));
            }
            out.push('\n');
        }
        out
    }

    fn symbol_at(&self, at: Coord, state: Option<&SearchState>, bridges: &BridgeVector) -> char {
        if state.is_some_and(|s| s.position.occupies(at)) {
            return BLOCK;
        }
        if at == self.start {
            return START;
        }
        if at == self.goal {
            return GOAL;
        }
        match self.cell_at(at) {
            Cell::Empty => EMPTY,
            Cell::Gray => GRAY,
            Cell::Orange => ORANGE,
            Cell::Bridge(bridge) if bridges.get(bridge) => BRIDGE_ON,
            Cell::Bridge(_) => BRIDGE_OFF,
            Cell::Switch(index) => match self.switches[index].kind {
                SwitchKind::Full => FULL_SWITCH,
                SwitchKind::Half => HALF_SWITCH,
            },
            Cell::Teleport(_) => TELEPORT,
        }
    }
}

impl TryFrom<&PuzzleConfig> for Board {
    type Error = LoadError;

    fn try_from(config: &PuzzleConfig) -> Result<Self, Self::Error> {
        Board::from_config(config)
    }
}

/// Initial layout, in the puzzle file's own symbols
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.draw(None, &self.initial_bridges()).trim_end_matches('\n'))
    }
}

fn read_grid(grid: &[String]) -> Result<Vec<Vec<char>>, LoadError> {
    let symbols: Vec<Vec<char>> = grid.iter().map(|line| line.chars().collect()).collect();
    let expected = match symbols.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => return Err(LoadError::EmptyGrid),
    };
    for (row, line) in symbols.iter().enumerate() {
        if line.len() != expected {
            return Err(LoadError::RaggedRow {
                row,
                expected,
                found: line.len(),
            });
        }
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{SwitchConfig, TeleportConfig};

    fn config(grid: &[&str]) -> PuzzleConfig {
        PuzzleConfig {
            name: "test".to_string(),
            passcode: "000000".to_string(),
            grid: grid.iter().map(|s| s.to_string()).collect(),
            bridges: Vec::new(),
            switches: Vec::new(),
            teleports: Vec::new(),
        }
    }

    fn mechanics_config() -> PuzzleConfig {
        let mut c = config(&["S.bbX", "-.O.T", "..BH."]);
        c.bridges = vec![vec![(0, 2), (0, 3)], vec![(2, 2)]];
        c.switches = vec![
            SwitchConfig(0, 4, vec![(0, BridgeAction::On)]),
            SwitchConfig(1, 2, vec![(1, BridgeAction::Swap), (0, BridgeAction::Off)]),
        ];
        c.teleports = vec![TeleportConfig(1, 4, 2, 0, 2, 4)];
        c
    }

    #[test]
    fn test_load_mechanics() {
        let board = Board::from_config(&mechanics_config()).unwrap();
        assert_eq!((board.rows(), board.cols()), (3, 5));
        assert_eq!(board.start(), Coord::new(0, 0));
        assert_eq!(board.goal(), Coord::new(2, 3));
        assert_eq!(board.cell_at(Coord::new(0, 0)), Cell::Gray);
        assert_eq!(board.cell_at(Coord::new(2, 3)), Cell::Gray);
        assert_eq!(board.cell_at(Coord::new(1, 0)), Cell::Orange);
        assert_eq!(board.bridge_of(Coord::new(0, 3)), Some(0));
        assert_eq!(board.bridge_of(Coord::new(2, 2)), Some(1));
        assert_eq!(board.bridge_count(), 2);
        assert_eq!(board.initial_bridges().to_string(), "01");
        assert_eq!(board.switch_kind(Coord::new(0, 4)), Some(SwitchKind::Full));
        assert_eq!(board.switch_kind(Coord::new(1, 2)), Some(SwitchKind::Half));
        assert_eq!(
            board.switch_actions(Coord::new(1, 2)),
            &[(1, BridgeAction::Swap), (0, BridgeAction::Off)]
        );
        assert!(board.switch_actions(Coord::new(1, 1)).is_empty());
        assert_eq!(
            board.teleport_target(Coord::new(1, 4)),
            Some((Coord::new(2, 0), Coord::new(2, 4)))
        );
    }

    #[test]
    fn test_out_of_bounds_reads_empty() {
        let board = Board::from_config(&config(&["SH"])).unwrap();
        assert!(!board.contains(Coord::new(-1, 0)));
        assert!(!board.contains(Coord::new(0, 2)));
        assert_eq!(board.cell_at(Coord::new(0, -1)), Cell::Empty);
        assert_eq!(board.cell_at(Coord::new(1, 0)), Cell::Empty);
    }

    #[test]
    fn test_display_round_trips_grid() {
        let c = mechanics_config();
        let board = Board::from_config(&c).unwrap();
        assert_eq!(board.to_string(), c.grid.join("\n"));
    }

    #[test]
    fn test_render_state() {
        let board = Board::from_config(&mechanics_config()).unwrap();
        let state = SearchState::new(
            BlockPosition::new(Coord::new(1, 1), Coord::new(2, 1)),
            BridgeVector::from_bools([true, false]),
        );
        assert_eq!(board.render(&state), "S.BBX\n-#O.T\n.#bH.\n");
    }

    #[test]
    fn test_grid_errors() {
        assert_eq!(Board::from_config(&config(&[])).unwrap_err(), LoadError::EmptyGrid);
        assert_eq!(Board::from_config(&config(&[""])).unwrap_err(), LoadError::EmptyGrid);
        assert_eq!(
            Board::from_config(&config(&["S.H", ".."])).unwrap_err(),
            LoadError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            Board::from_config(&config(&["S?H"])).unwrap_err(),
            LoadError::UnknownSymbol {
                symbol: '?',
                row: 0,
                col: 1
            }
        );
        assert_eq!(Board::from_config(&config(&["..H"])).unwrap_err(), LoadError::MissingStart);
        assert_eq!(Board::from_config(&config(&["S.."])).unwrap_err(), LoadError::MissingGoal);
        assert_eq!(
            Board::from_config(&config(&["S.S", "..H"])).unwrap_err(),
            LoadError::DuplicateStart { row: 0, col: 2 }
        );
        assert_eq!(
            Board::from_config(&config(&["SHH"])).unwrap_err(),
            LoadError::DuplicateGoal { row: 0, col: 2 }
        );
    }

    #[test]
    fn test_bridge_errors() {
        let mut c = config(&["SBbH"]);
        c.bridges = vec![vec![(0, 1), (0, 2)]];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::MixedBridge {
                bridge: 0,
                row: 0,
                col: 2
            }
        );

        c.bridges = vec![vec![(0, 1)], vec![(0, 2)], vec![(0, 1)]];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::SharedBridgeCell {
                bridge: 2,
                row: 0,
                col: 1
            }
        );

        c.bridges = vec![vec![(0, 1)]];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::UnreferencedBridgeCell { row: 0, col: 2 }
        );

        c.bridges = vec![vec![(0, 0)]];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::NotABridgeCell {
                bridge: 0,
                row: 0,
                col: 0
            }
        );

        c.bridges = vec![vec![(0, 1), (5, 5)]];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::BridgeOutOfBounds {
                bridge: 0,
                row: 5,
                col: 5
            }
        );

        c.bridges = vec![vec![]];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::EmptyBridge { bridge: 0 }
        );
    }

    #[test]
    fn test_switch_errors() {
        let mut c = config(&["SXOH"]);
        c.switches = vec![SwitchConfig(0, 1, vec![])];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::SwitchCountMismatch {
                entries: 1,
                cells: 2
            }
        );

        c.switches = vec![SwitchConfig(0, 1, vec![]), SwitchConfig(0, 1, vec![])];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::DuplicateSwitch { row: 0, col: 1 }
        );

        c.switches = vec![SwitchConfig(0, 0, vec![])];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::NotASwitchCell { row: 0, col: 0 }
        );

        c.switches = vec![SwitchConfig(0, 2, vec![(3, BridgeAction::On)])];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::UnknownBridge {
                row: 0,
                col: 2,
                bridge: 3
            }
        );
    }

    #[test]
    fn test_teleport_errors() {
        let mut c = config(&["STH"]);
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::TeleportCountMismatch {
                entries: 0,
                cells: 1
            }
        );

        c.teleports = vec![TeleportConfig(0, 0, 0, 2, 0, 2)];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::NotATeleportCell { row: 0, col: 0 }
        );

        c.teleports = vec![TeleportConfig(0, 1, 0, 2, 1, 2)];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::TeleportOutOfBounds { row: 0, col: 1 }
        );

        c.teleports = vec![TeleportConfig(0, 1, 0, 2, 0, 0), TeleportConfig(0, 1, 0, 0, 0, 0)];
        assert_eq!(
            Board::from_config(&c).unwrap_err(),
            LoadError::DuplicateTeleport { row: 0, col: 1 }
        );
    }
}
