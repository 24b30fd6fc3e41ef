//! Locally cached agent state.

use robbie_types::{Coord, Direction, GridSize};

/// What the adapter currently believes about the agent.
///
/// Every field starts unknown and is filled on first need. After that it
/// is trusted, and only changed once the agent has acknowledged a command
/// that changes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowState {
    pub location: Option<Coord>,
    pub facing: Option<Direction>,
    /// Gems the agent holds.
    pub gems: Option<u32>,
    pub grid_size: Option<GridSize>,
}

impl ShadowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything tied to the current grid. Called after a new grid
    /// is loaded, since it places the agent afresh.
    pub fn forget_grid(&mut self) {
        self.location = None;
        self.facing = None;
        self.grid_size = None;
    }

    /// `true` when nothing has been learned yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
