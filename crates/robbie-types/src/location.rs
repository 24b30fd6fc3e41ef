use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in a script, used only for diagnostics.
///
/// `line` and `column` are 1-based; `offset` is the raw byte offset the
/// cursor was at when the location was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Location of the very first byte of a script.
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
