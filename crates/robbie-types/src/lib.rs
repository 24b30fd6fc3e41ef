//! Shared types for the Robbie interpreter.
//!
//! This crate defines the error type, source locations, grid directions and
//! cell contents, and the [`AgentCommands`] seam between the interpreter and
//! whatever drives the agent.

mod agent;
mod direction;
mod error;
mod grid;
mod location;

pub use agent::AgentCommands;
pub use direction::{
    Direction, RelativeDirection, DIRECTION_COUNT, LEGACY_ROTATION_MODULUS,
};
pub use error::{ErrorCategory, ErrorCode, RobbieError};
pub use grid::{Cell, Coord, GridSize, ParseValueError, MAX_GEMS_PER_CELL};
pub use location::Location;

/// Result type used throughout the Robbie interpreter.
pub type Result<T> = std::result::Result<T, RobbieError>;
