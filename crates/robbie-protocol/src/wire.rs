//! Wire codec: request lines and what each one expects back.
//!
//! The protocol is newline-delimited ASCII, one request line answered by
//! one response line. Commands that change something are answered with
//! the request echoed behind `ACK `; queries are answered with a keyword
//! prefix followed by space-separated fields.

use robbie_types::{Cell, Coord, Direction};
use std::fmt;
use std::str::FromStr;

/// Response sent when a command's parameters are rejected.
pub const CMDFAIL: &str = "CMDFAIL";

/// Response sent when a command is not recognized at all.
pub const CMDERR: &str = "CMDERR";

/// Prefix of every acknowledgement.
pub const ACK: &str = "ACK";

/// One request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Goto(Coord),
    GetLocation,
    Face(Direction),
    GetFacing,
    GiveGems(u32),
    GetGemCount,
    SetCell(Coord, Cell),
    GetCell(Coord),
    LoadGrid(String),
    GetSize,
    ShowMessages(bool),
    Stop,
}

/// How a response to a [`Request`] is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// The response must equal this line exactly.
    Ack(String),
    /// The response must start with these words; the rest are fields.
    Prefix(String),
}

impl Request {
    /// What a successful response looks like.
    pub fn expected(&self) -> Expected {
        match self {
            Request::GetLocation => Expected::Prefix("ROBISAT".into()),
            Request::GetFacing => Expected::Prefix("ROBISFACING".into()),
            Request::GetGemCount => Expected::Prefix("ROBHAS".into()),
            Request::GetCell(at) => Expected::Prefix(format!("GRID {at}")),
            Request::GetSize => Expected::Prefix("GRIDSIZE".into()),
            _ => Expected::Ack(format!("{ACK} {self}")),
        }
    }

    /// `true` for requests answered with an acknowledgement.
    pub fn is_command(&self) -> bool {
        matches!(self.expected(), Expected::Ack(_))
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Goto(at) => write!(f, "GOTO {at}"),
            Request::GetLocation => f.write_str("GETLOC"),
            Request::Face(dir) => write!(f, "FACE {dir}"),
            Request::GetFacing => f.write_str("GETDIR"),
            Request::GiveGems(n) => write!(f, "GIVEROB {n}"),
            Request::GetGemCount => f.write_str("GETJEWLCNT"),
            Request::SetCell(at, cell) => write!(f, "SETGRID {at} {cell}"),
            Request::GetCell(at) => write!(f, "GETGRID {at}"),
            Request::LoadGrid(name) => write!(f, "LOADGRID {name}"),
            Request::GetSize => f.write_str("GETSIZE"),
            Request::ShowMessages(on) => {
                write!(f, "SHOWMSGS {}", if *on { "ON" } else { "OFF" })
            }
            Request::Stop => f.write_str("STOP"),
        }
    }
}

/// Why a request line could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestParseError {
    /// The keyword is not part of the protocol (answered `CMDERR`).
    UnknownCommand,
    /// The keyword is known but its parameters are wrong (answered `CMDFAIL`).
    BadParameters,
}

impl RequestParseError {
    /// The sentinel a server answers with.
    pub fn sentinel(self) -> &'static str {
        match self {
            RequestParseError::UnknownCommand => CMDERR,
            RequestParseError::BadParameters => CMDFAIL,
        }
    }
}

impl FromStr for Request {
    type Err = RequestParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches('\r');
        let (keyword, rest) = match line.split_once(' ') {
            Some((k, r)) => (k, r),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();
        let bad = RequestParseError::BadParameters;

        let request = match keyword {
            "GOTO" => Request::Goto(coord(&args)?),
            "GETLOC" => Request::GetLocation,
            "FACE" => match args.as_slice() {
                [dir] => Request::Face(dir.parse().map_err(|_| bad)?),
                _ => return Err(bad),
            },
            "GETDIR" => Request::GetFacing,
            "GIVEROB" => match args.as_slice() {
                [n] => Request::GiveGems(n.parse().map_err(|_| bad)?),
                _ => return Err(bad),
            },
            "GETJEWLCNT" => Request::GetGemCount,
            "SETGRID" => match args.as_slice() {
                [x, y, c] => Request::SetCell(coord(&[*x, *y])?, c.parse().map_err(|_| bad)?),
                _ => return Err(bad),
            },
            "GETGRID" => Request::GetCell(coord(&args)?),
            "LOADGRID" if !rest.trim().is_empty() => Request::LoadGrid(rest.trim().to_string()),
            "LOADGRID" => return Err(bad),
            "GETSIZE" => Request::GetSize,
            "SHOWMSGS" => match args.as_slice() {
                ["ON"] => Request::ShowMessages(true),
                ["OFF"] => Request::ShowMessages(false),
                _ => return Err(bad),
            },
            "STOP" => Request::Stop,
            _ => return Err(RequestParseError::UnknownCommand),
        };
        Ok(request)
    }
}

fn coord(args: &[&str]) -> Result<Coord, RequestParseError> {
    let bad = RequestParseError::BadParameters;
    match args {
        [x, y] => Ok(Coord::new(
            x.parse().map_err(|_| bad)?,
            y.parse().map_err(|_| bad)?,
        )),
        _ => Err(bad),
    }
}

/// The fields following `prefix` in `response`, or `None` if the response
/// does not start with the prefix words.
pub fn fields<'r>(response: &'r str, prefix: &str) -> Option<Vec<&'r str>> {
    let rest = response.strip_prefix(prefix)?;
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    Some(rest.split_whitespace().collect())
}
