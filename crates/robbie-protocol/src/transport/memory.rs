//! In-memory grid world that answers the full wire protocol.

use robbie_types::{Cell, Coord, Direction, GridSize, ParseValueError};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use super::Transport;
use crate::error::{ProtocolError, ProtocolResult};
use crate::wire::{Request, ACK, CMDFAIL};

/// A grid with an agent on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWorld {
    /// Rows, top to bottom.
    cells: Vec<Vec<Cell>>,
    pub agent: Coord,
    pub facing: Direction,
    pub gems: u32,
}

impl GridWorld {
    /// An open grid of empty cells; the agent stands at `(0, 0)` facing up.
    pub fn open(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![Cell::EMPTY; width]; height],
            agent: Coord::new(0, 0),
            facing: Direction::Up,
            gems: 0,
        }
    }

    /// Build a grid from rows of cell characters (`X`, `.`, `0`-`9`).
    /// Blank lines and surrounding whitespace are ignored.
    pub fn parse(layout: &str) -> Result<Self, ParseValueError> {
        let cells = layout
            .lines()
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| {
                row.chars()
                    .map(|c| c.to_string().parse::<Cell>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            cells,
            ..Self::open(0, 0)
        })
    }

    pub fn with_agent(mut self, at: Coord, facing: Direction) -> Self {
        self.agent = at;
        self.facing = facing;
        self
    }

    pub fn with_gems(mut self, gems: u32) -> Self {
        self.gems = gems;
        self
    }

    pub fn size(&self) -> GridSize {
        let height = self.cells.len();
        let width = self.cells.first().map_or(0, Vec::len);
        GridSize::new(width as i32, height as i32)
    }

    pub fn cell(&self, at: Coord) -> Option<Cell> {
        if !self.size().contains(at) {
            return None;
        }
        Some(self.cells[at.y as usize][at.x as usize])
    }

    pub fn set_cell(&mut self, at: Coord, cell: Cell) -> bool {
        if !self.size().contains(at) {
            return false;
        }
        self.cells[at.y as usize][at.x as usize] = cell;
        true
    }

    /// Apply one request; returns the response line.
    fn apply(&mut self, request: &Request) -> String {
        let ack = || format!("{ACK} {request}");
        match request {
            Request::Goto(at) => match self.cell(*at) {
                Some(cell) if !cell.is_wall() => {
                    self.agent = *at;
                    ack()
                }
                _ => CMDFAIL.to_string(),
            },
            Request::GetLocation => format!("ROBISAT {}", self.agent),
            Request::Face(dir) => {
                self.facing = *dir;
                ack()
            }
            Request::GetFacing => format!("ROBISFACING {}", self.facing),
            Request::GiveGems(n) => {
                self.gems = *n;
                ack()
            }
            Request::GetGemCount => format!("ROBHAS {}", self.gems),
            Request::SetCell(at, cell) => {
                if self.set_cell(*at, *cell) {
                    ack()
                } else {
                    CMDFAIL.to_string()
                }
            }
            Request::GetCell(at) => match self.cell(*at) {
                Some(cell) => format!("GRID {at} {cell}"),
                None => CMDFAIL.to_string(),
            },
            Request::GetSize => {
                let size = self.size();
                format!("GRIDSIZE {} {}", size.width, size.height)
            }
            Request::ShowMessages(_) | Request::Stop => ack(),
            // Handled by the transport, which owns the named grids.
            Request::LoadGrid(_) => CMDFAIL.to_string(),
        }
    }
}

/// A transport whose far end is a [`GridWorld`] in memory.
///
/// Answers every request the way a live agent would, including `CMDFAIL`
/// for out-of-range coordinates and `CMDERR` for unknown commands. Named
/// grids can be registered for `LOADGRID`.
#[derive(Debug)]
pub struct MemoryTransport {
    world: GridWorld,
    grids: HashMap<String, GridWorld>,
    responses: VecDeque<String>,
    requests: Vec<String>,
    show_messages: bool,
    stopped: bool,
    closed: bool,
    /// Requests starting with this get no answer.
    silent_on: Option<String>,
    /// Requests starting with this are answered `CMDFAIL`.
    fail_on: Option<String>,
}

impl MemoryTransport {
    pub fn new(world: GridWorld) -> Self {
        Self {
            world,
            grids: HashMap::new(),
            responses: VecDeque::new(),
            requests: Vec::new(),
            show_messages: false,
            stopped: false,
            closed: false,
            silent_on: None,
            fail_on: None,
        }
    }

    /// Register a grid that `LOADGRID name` switches to.
    pub fn with_grid(mut self, name: &str, world: GridWorld) -> Self {
        self.grids.insert(name.to_string(), world);
        self
    }

    /// Never answer requests starting with `prefix`.
    pub fn silent_on(mut self, prefix: &str) -> Self {
        self.silent_on = Some(prefix.to_string());
        self
    }

    /// Answer requests starting with `prefix` with `CMDFAIL`, without
    /// applying them.
    pub fn fail_on(mut self, prefix: &str) -> Self {
        self.fail_on = Some(prefix.to_string());
        self
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Every request line received, in order.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    pub fn show_messages(&self) -> bool {
        self.show_messages
    }

    /// `true` once a `STOP` has been acknowledged.
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn respond(&mut self, line: &str) -> String {
        if self
            .fail_on
            .as_deref()
            .is_some_and(|prefix| line.starts_with(prefix))
        {
            return CMDFAIL.to_string();
        }

        let request = match line.parse::<Request>() {
            Ok(request) => request,
            Err(err) => return err.sentinel().to_string(),
        };
        match &request {
            Request::LoadGrid(name) => match self.grids.get(name) {
                Some(world) => {
                    self.world = world.clone();
                    format!("{ACK} {request}")
                }
                None => CMDFAIL.to_string(),
            },
            Request::ShowMessages(on) => {
                self.show_messages = *on;
                self.world.apply(&request)
            }
            Request::Stop => {
                self.stopped = true;
                self.world.apply(&request)
            }
            _ => self.world.apply(&request),
        }
    }
}

impl Transport for MemoryTransport {
    fn send_line(&mut self, line: &str) -> ProtocolResult<()> {
        if self.closed {
            return Err(ProtocolError::Connection("transport is closed".into()));
        }
        self.requests.push(line.to_string());
        if self
            .silent_on
            .as_deref()
            .is_some_and(|prefix| line.starts_with(prefix))
        {
            return Ok(());
        }
        let response = self.respond(line);
        self.responses.push_back(response);
        Ok(())
    }

    fn receive_line(&mut self, _timeout: Duration) -> ProtocolResult<Option<String>> {
        if self.closed {
            return Err(ProtocolError::Connection("transport is closed".into()));
        }
        Ok(self.responses.pop_front())
    }

    fn close(&mut self) -> ProtocolResult<()> {
        self.closed = true;
        Ok(())
    }
}
