//! Absolute and relative grid directions.

use crate::grid::ParseValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of absolute directions.
pub const DIRECTION_COUNT: usize = 4;

/// Rotation modulus used by the legacy interpreter for the RIGHT, BACK and
/// LEFT relative directions. It folds LEFT back onto UP for some facings;
/// kept selectable so scripts written against that behavior still run.
pub const LEGACY_ROTATION_MODULUS: usize = 3;

/// An absolute facing on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in clockwise order, starting at UP.
    pub const CLOCKWISE: [Direction; DIRECTION_COUNT] =
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// Position of this direction in [`Direction::CLOCKWISE`].
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// The direction a quarter turn clockwise from this one.
    pub fn turned_right(self) -> Self {
        Self::CLOCKWISE[(self.index() + 1) % DIRECTION_COUNT]
    }

    /// The direction a quarter turn counter-clockwise from this one.
    pub fn turned_left(self) -> Self {
        Self::CLOCKWISE[(self.index() + DIRECTION_COUNT - 1) % DIRECTION_COUNT]
    }

    /// Coordinate delta of one step in this direction. `(0, 0)` is the
    /// top-left cell, so UP decreases `y`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// The wire spelling (`UP`, `RIGHT`, `DOWN`, `LEFT`).
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(Direction::Up),
            "RIGHT" => Ok(Direction::Right),
            "DOWN" => Ok(Direction::Down),
            "LEFT" => Ok(Direction::Left),
            other => Err(ParseValueError::Direction(other.to_string())),
        }
    }
}

/// A direction relative to the agent's current facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelativeDirection {
    Front,
    Right,
    Back,
    Left,
}

impl RelativeDirection {
    /// All relative directions.
    pub const ALL: [RelativeDirection; 4] = [
        RelativeDirection::Front,
        RelativeDirection::Right,
        RelativeDirection::Back,
        RelativeDirection::Left,
    ];

    /// Clockwise rotation, in quarter turns, from the facing.
    pub fn offset(self) -> usize {
        match self {
            RelativeDirection::Front => 0,
            RelativeDirection::Right => 1,
            RelativeDirection::Back => 2,
            RelativeDirection::Left => 3,
        }
    }

    /// Resolve against `facing` using [`DIRECTION_COUNT`] as the modulus.
    pub fn resolve(self, facing: Direction) -> Direction {
        self.resolve_with(facing, DIRECTION_COUNT)
    }

    /// Resolve against `facing` with an explicit rotation modulus.
    ///
    /// FRONT always returns `facing`; the other three index the clockwise
    /// order at `(facing + offset) % modulus`. `modulus` must be in
    /// `1..=DIRECTION_COUNT`.
    pub fn resolve_with(self, facing: Direction, modulus: usize) -> Direction {
        match self {
            RelativeDirection::Front => facing,
            _ => Direction::CLOCKWISE[(facing.index() + self.offset()) % modulus],
        }
    }
}

impl fmt::Display for RelativeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelativeDirection::Front => "FRONT",
            RelativeDirection::Right => "RIGHT",
            RelativeDirection::Back => "BACK",
            RelativeDirection::Left => "LEFT",
        };
        f.write_str(name)
    }
}
