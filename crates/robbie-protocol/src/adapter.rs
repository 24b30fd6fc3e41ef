//! Stateful command adapter.
//!
//! Language-level operations (step, take, "is the front clear?") become one
//! or more request/response exchanges. Location, facing, held gems and grid
//! size are asked for once and then served from the [`ShadowState`].

use robbie_types::{
    AgentCommands, Cell, Coord, Direction, GridSize, RelativeDirection, Result,
    DIRECTION_COUNT, MAX_GEMS_PER_CELL,
};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ProtocolError, ProtocolResult};
use crate::shadow::ShadowState;
use crate::transport::Transport;
use crate::wire::{self, Expected, Request, CMDERR, CMDFAIL};

/// How long to wait for each response.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Adapter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Deadline for every response.
    pub message_timeout: Duration,
    /// Modulus used when rotating a relative direction onto the facing.
    pub rotation_modulus: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            rotation_modulus: DIRECTION_COUNT,
        }
    }
}

/// Drives the agent over a [`Transport`].
pub struct CommandInterface<T: Transport> {
    transport: T,
    config: AdapterConfig,
    shadow: ShadowState,
}

impl<T: Transport> CommandInterface<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, AdapterConfig::default())
    }

    pub fn with_config(transport: T, config: AdapterConfig) -> Self {
        Self {
            transport,
            config,
            shadow: ShadowState::new(),
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// What the adapter currently believes about the agent.
    pub fn shadow(&self) -> &ShadowState {
        &self.shadow
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Release the connection.
    pub fn close(&mut self) -> ProtocolResult<()> {
        self.transport.close()
    }

    // ── Session control ───────────────────────────────────────────────────────

    /// Ask the remote side to display (or hide) protocol traffic.
    pub fn set_show_messages(&mut self, on: bool) -> ProtocolResult<()> {
        self.command(Request::ShowMessages(on))
    }

    /// Load a named grid. The agent is placed afresh, so location, facing
    /// and size are forgotten and the size is fetched again.
    pub fn load_grid(&mut self, name: &str) -> ProtocolResult<()> {
        self.command(Request::LoadGrid(name.to_string()))?;
        self.shadow.forget_grid();
        self.grid_size()?;
        Ok(())
    }

    /// Set the number of gems the agent holds.
    pub fn give_gems(&mut self, count: u32) -> ProtocolResult<()> {
        self.command(Request::GiveGems(count))?;
        self.shadow.gems = Some(count);
        Ok(())
    }

    pub fn send_stop(&mut self) -> ProtocolResult<()> {
        self.command(Request::Stop)
    }

    // ── Exchanges ─────────────────────────────────────────────────────────────

    /// Send one request and wait for its response line.
    ///
    /// Failure sentinels become errors here; anything else is returned for
    /// the caller to match.
    fn exchange(&mut self, request: &Request) -> ProtocolResult<String> {
        let line = request.to_string();
        tracing::debug!(request = %line, "send");
        self.transport.send_line(&line)?;

        let Some(response) = self.transport.receive_line(self.config.message_timeout)? else {
            tracing::debug!(request = %line, "no response");
            return Err(ProtocolError::Timeout {
                request: line,
                timeout_ms: self.config.message_timeout.as_millis(),
            });
        };
        tracing::debug!(request = %line, response = %response, "receive");

        match response.as_str() {
            CMDFAIL => Err(ProtocolError::CommandFailed { request: line }),
            CMDERR => Err(ProtocolError::NotRecognized { request: line }),
            _ => Ok(response),
        }
    }

    /// A command answered with its exact acknowledgement.
    fn command(&mut self, request: Request) -> ProtocolResult<()> {
        let response = self.exchange(&request)?;
        match request.expected() {
            Expected::Ack(ack) if response == ack => Ok(()),
            Expected::Ack(expected) | Expected::Prefix(expected) => {
                Err(ProtocolError::UnexpectedResponse {
                    request: request.to_string(),
                    expected,
                    found: response,
                })
            }
        }
    }

    /// A query answered with a prefix and `count` fields, each parsed as `F`.
    fn query<F: FromStr>(&mut self, request: Request, count: usize) -> ProtocolResult<Vec<F>> {
        let response = self.exchange(&request)?;
        let prefix = match request.expected() {
            Expected::Prefix(prefix) | Expected::Ack(prefix) => prefix,
        };
        let Some(fields) = wire::fields(&response, &prefix) else {
            return Err(ProtocolError::UnexpectedResponse {
                request: request.to_string(),
                expected: prefix,
                found: response,
            });
        };
        let parsed: Option<Vec<F>> = if fields.len() == count {
            fields.iter().map(|f| f.parse().ok()).collect()
        } else {
            None
        };
        parsed.ok_or_else(|| ProtocolError::Malformed {
            request: request.to_string(),
            response,
        })
    }

    // ── Shadowed facts ────────────────────────────────────────────────────────

    fn location(&mut self) -> ProtocolResult<Coord> {
        if let Some(at) = self.shadow.location {
            return Ok(at);
        }
        let xy: Vec<i32> = self.query(Request::GetLocation, 2)?;
        let at = Coord::new(xy[0], xy[1]);
        self.shadow.location = Some(at);
        Ok(at)
    }

    fn facing(&mut self) -> ProtocolResult<Direction> {
        if let Some(dir) = self.shadow.facing {
            return Ok(dir);
        }
        let dir: Vec<Direction> = self.query(Request::GetFacing, 1)?;
        self.shadow.facing = Some(dir[0]);
        Ok(dir[0])
    }

    fn gem_count(&mut self) -> ProtocolResult<u32> {
        if let Some(n) = self.shadow.gems {
            return Ok(n);
        }
        let n: Vec<u32> = self.query(Request::GetGemCount, 1)?;
        self.shadow.gems = Some(n[0]);
        Ok(n[0])
    }

    fn grid_size(&mut self) -> ProtocolResult<GridSize> {
        if let Some(size) = self.shadow.grid_size {
            return Ok(size);
        }
        let wh: Vec<i32> = self.query(Request::GetSize, 2)?;
        let size = GridSize::new(wh[0], wh[1]);
        self.shadow.grid_size = Some(size);
        Ok(size)
    }

    /// Not shadowed; every call asks the agent.
    fn cell(&mut self, at: Coord) -> ProtocolResult<Cell> {
        let cell: Vec<Cell> = self.query(Request::GetCell(at), 1)?;
        Ok(cell[0])
    }

    fn set_cell(&mut self, at: Coord, cell: Cell) -> ProtocolResult<()> {
        self.command(Request::SetCell(at, cell))
    }

    fn face(&mut self, dir: Direction) -> ProtocolResult<()> {
        self.command(Request::Face(dir))?;
        self.shadow.facing = Some(dir);
        Ok(())
    }

    /// The cell next to the agent towards `dir`, or `None` past the edge.
    fn neighbour(&mut self, dir: Direction) -> ProtocolResult<Option<Coord>> {
        let here = self.location()?;
        let size = self.grid_size()?;
        let there = here.step(dir);
        Ok(size.contains(there).then_some(there))
    }

    // ── Operations ────────────────────────────────────────────────────────────

    fn step(&mut self) -> ProtocolResult<()> {
        let facing = self.facing()?;
        let Some(target) = self.neighbour(facing)? else {
            return Ok(());
        };
        if self.cell(target)?.is_wall() {
            return Ok(());
        }
        self.command(Request::Goto(target))?;
        self.shadow.location = Some(target);
        Ok(())
    }

    fn take(&mut self) -> ProtocolResult<()> {
        let facing = self.facing()?;
        let Some(target) = self.neighbour(facing)? else {
            return Ok(());
        };
        let found = self.cell(target)?.gems();
        if found == 0 {
            return Ok(());
        }
        let held = self.gem_count()?;
        let total = held
            .checked_add(u32::from(found))
            .ok_or(ProtocolError::GemOverflow { held, found })?;
        self.set_cell(target, Cell::EMPTY)?;
        self.give_gems(total)
    }

    fn drop_gem(&mut self) -> ProtocolResult<()> {
        let held = self.gem_count()?;
        if held == 0 {
            return Ok(());
        }
        let facing = self.facing()?;
        let Some(target) = self.neighbour(facing)? else {
            return Ok(());
        };
        match self.cell(target)? {
            Cell::Wall => Ok(()),
            Cell::Gems(n) if n >= MAX_GEMS_PER_CELL => Ok(()),
            Cell::Gems(n) => {
                self.set_cell(target, Cell::Gems(n + 1))?;
                self.give_gems(held - 1)
            }
        }
    }

    fn sees_gem_ahead(&mut self) -> ProtocolResult<bool> {
        let facing = self.facing()?;
        match self.neighbour(facing)? {
            Some(target) => Ok(self.cell(target)?.gems() > 0),
            None => Ok(false),
        }
    }

    fn clear_towards(&mut self, rel: RelativeDirection) -> ProtocolResult<bool> {
        let facing = self.facing()?;
        let dir = rel.resolve_with(facing, self.config.rotation_modulus);
        match self.neighbour(dir)? {
            Some(target) => Ok(!self.cell(target)?.is_wall()),
            None => Ok(false),
        }
    }
}

impl<T: Transport> AgentCommands for CommandInterface<T> {
    fn move_forward(&mut self) -> Result<()> {
        Ok(self.step()?)
    }

    fn turn_left(&mut self) -> Result<()> {
        let facing = self.facing()?;
        Ok(self.face(facing.turned_left())?)
    }

    fn turn_right(&mut self) -> Result<()> {
        let facing = self.facing()?;
        Ok(self.face(facing.turned_right())?)
    }

    fn take_adjacent(&mut self) -> Result<()> {
        Ok(self.take()?)
    }

    fn drop_adjacent(&mut self) -> Result<()> {
        Ok(self.drop_gem()?)
    }

    fn is_facing(&mut self, direction: Direction) -> Result<bool> {
        Ok(self.facing()? == direction)
    }

    fn has_gem(&mut self) -> Result<bool> {
        Ok(self.gem_count()? > 0)
    }

    fn sees_gem(&mut self) -> Result<bool> {
        Ok(self.sees_gem_ahead()?)
    }

    fn is_clear(&mut self, direction: RelativeDirection) -> Result<bool> {
        Ok(self.clear_towards(direction)?)
    }

    fn init_grid(&mut self, filename: &str) -> Result<()> {
        Ok(self.load_grid(filename)?)
    }

    fn init_gem_count(&mut self, count: u32) -> Result<()> {
        Ok(self.give_gems(count)?)
    }

    fn stop(&mut self) -> Result<()> {
        Ok(self.send_stop()?)
    }
}
