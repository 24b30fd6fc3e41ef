//! Grid coordinates and cell contents.

use crate::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Most gems a single cell can hold.
pub const MAX_GEMS_PER_CELL: u8 = 9;

/// Errors raised when a wire value does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    #[error("unknown direction '{0}'")]
    Direction(String),

    #[error("invalid cell content '{0}'")]
    Cell(String),
}

/// A grid coordinate. `(0, 0)` is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring coordinate one step towards `dir`.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl GridSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// `true` if `coord` lies inside the grid.
    pub fn contains(self, coord: Coord) -> bool {
        (0..self.width).contains(&coord.x) && (0..self.height).contains(&coord.y)
    }
}

/// What a grid cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Gems(u8),
}

impl Cell {
    /// An empty, walkable cell.
    pub const EMPTY: Cell = Cell::Gems(0);

    pub fn is_wall(self) -> bool {
        matches!(self, Cell::Wall)
    }

    /// Gems on the cell; walls hold none.
    pub fn gems(self) -> u8 {
        match self {
            Cell::Wall => 0,
            Cell::Gems(n) => n,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Wall => f.write_str("X"),
            Cell::Gems(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for Cell {
    type Err = ParseValueError;

    /// Parses the wire form: `X` for a wall, a single digit for a gem
    /// count, `.` for an empty cell.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [b'X'] => Ok(Cell::Wall),
            [b'.'] => Ok(Cell::EMPTY),
            [d @ b'0'..=b'9'] => Ok(Cell::Gems(d - b'0')),
            _ => Err(ParseValueError::Cell(s.to_string())),
        }
    }
}
