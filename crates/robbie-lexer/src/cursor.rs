//! Seekable byte source.
//!
//! The interpreter never builds a tree; loops and calls replay script text
//! by saving a [`SourcePos`] and seeking back to it. The cursor is an owned
//! buffer plus an offset, so it can be driven from memory in tests and
//! positions are plain copyable values.

use robbie_types::Location;
use std::fs;
use std::io;
use std::path::Path;

/// An opaque position in a [`SourceCursor`].
///
/// Only meaningful for the cursor it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePos(usize);

impl SourcePos {
    /// Raw byte offset, for diagnostics.
    pub fn offset(self) -> usize {
        self.0
    }
}

/// An in-memory script with a movable read position.
#[derive(Debug, Clone)]
pub struct SourceCursor {
    name: String,
    bytes: Vec<u8>,
    pos: usize,
    /// Byte offset at which each line starts.
    line_starts: Vec<usize>,
}

impl SourceCursor {
    /// Create a cursor over `source`, positioned at its start.
    pub fn new(name: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        let bytes = source.into();
        let line_starts = std::iter::once(0)
            .chain(
                bytes
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| **b == b'\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Self {
            name: name.into(),
            bytes,
            pos: 0,
            line_starts,
        }
    }

    /// Read a whole script file into a cursor.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        Ok(Self::new(path.display().to_string(), bytes))
    }

    /// Script name (file path, or whatever the caller passed in).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // ── Position ─────────────────────────────────────────────────────────

    pub fn position(&self) -> SourcePos {
        SourcePos(self.pos)
    }

    /// Move the read position. Positions past the end clamp to the end.
    pub fn seek(&mut self, pos: SourcePos) {
        self.pos = pos.0.min(self.bytes.len());
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    // ── Bytes ────────────────────────────────────────────────────────────

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    pub fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    // ── Diagnostics ──────────────────────────────────────────────────────

    /// Line and column of the current position.
    pub fn location(&self) -> Location {
        self.location_of(self.position())
    }

    /// Line and column of an arbitrary position.
    pub fn location_of(&self, pos: SourcePos) -> Location {
        let offset = pos.0.min(self.bytes.len());
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = offset - self.line_starts[idx] + 1;
        Location::new(offset, idx as u32 + 1, column as u32)
    }

    /// Text of a 1-based line, without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<String> {
        let idx = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1))
            .unwrap_or(self.bytes.len());
        let text = String::from_utf8_lossy(&self.bytes[start..end]);
        Some(text.trim_end_matches('\r').to_string())
    }
}
