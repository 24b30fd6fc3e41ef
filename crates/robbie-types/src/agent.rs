use crate::{Direction, RelativeDirection, Result};

/// Everything the interpreter can ask of the agent.
///
/// The protocol adapter implements this over a live connection; tests
/// implement it directly to observe what a script does.
pub trait AgentCommands {
    /// Step one cell forward. Walls and the grid edge make this a no-op.
    fn move_forward(&mut self) -> Result<()>;

    fn turn_left(&mut self) -> Result<()>;

    fn turn_right(&mut self) -> Result<()>;

    /// Pick up every gem on the cell in front.
    fn take_adjacent(&mut self) -> Result<()>;

    /// Put one held gem on the cell in front.
    fn drop_adjacent(&mut self) -> Result<()>;

    fn is_facing(&mut self, direction: Direction) -> Result<bool>;

    /// `true` if the agent holds at least one gem.
    fn has_gem(&mut self) -> Result<bool>;

    /// `true` if the cell in front holds at least one gem.
    fn sees_gem(&mut self) -> Result<bool>;

    /// `true` if the neighbouring cell in `direction` is not a wall.
    fn is_clear(&mut self, direction: RelativeDirection) -> Result<bool>;

    /// Load a grid by name on the remote side.
    fn init_grid(&mut self, filename: &str) -> Result<()>;

    /// Set the number of gems the agent holds.
    fn init_gem_count(&mut self, count: u32) -> Result<()>;

    /// Tell the remote side the run is over.
    fn stop(&mut self) -> Result<()>;
}
