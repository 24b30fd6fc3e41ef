//! Procedure table: name to body position.

use robbie_lexer::SourcePos;
use std::collections::HashMap;

/// Maps each declared procedure to the position just before its body's
/// opening brace.
#[derive(Debug, Clone, Default)]
pub struct ProcTable {
    entries: HashMap<String, SourcePos>,
}

impl ProcTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a procedure. A later declaration of the same name replaces
    /// the earlier one; returns `true` when that happened.
    pub fn declare(&mut self, name: impl Into<String>, body: SourcePos) -> bool {
        self.entries.insert(name.into(), body).is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<SourcePos> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
