//! Core interpreter state: tokenizer, procedure table, agent, helpers.

use robbie_lexer::{SourceCursor, SourcePos, Token, Tokenizer};
use robbie_types::{AgentCommands, ErrorCode, Result, RobbieError};
use std::io::Write;

use crate::procs::ProcTable;

/// Nested `call`s allowed before a run is aborted.
pub const DEFAULT_MAX_CALL_DEPTH: u32 = 200;

/// The Robbie interpreter.
///
/// Reads the script through a [`Tokenizer`] and drives `agent` as each
/// instruction is recognized. `print` output goes to `out`.
pub struct Interpreter<'a> {
    /// The token stream, read on demand.
    pub(crate) tokens: Tokenizer,
    /// Procedures declared ahead of `main`.
    pub(crate) procs: ProcTable,
    /// Whoever carries out commands and answers tests.
    pub(crate) agent: &'a mut dyn AgentCommands,
    /// Sink for `print`.
    pub(crate) out: &'a mut dyn Write,
    /// Current procedure call nesting.
    pub(crate) depth: u32,
    pub(crate) max_call_depth: u32,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter over `source`.
    pub fn new(
        source: SourceCursor,
        agent: &'a mut dyn AgentCommands,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            tokens: Tokenizer::new(source),
            procs: ProcTable::new(),
            agent,
            out,
            depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Override the call depth limit.
    pub fn with_max_call_depth(mut self, max_call_depth: u32) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Procedures seen so far.
    pub fn procedures(&self) -> &ProcTable {
        &self.procs
    }

    // ── Token helpers ─────────────────────────────────────────────────────────

    /// Build an error located at the token starting at or after `at`.
    pub(crate) fn fail(&self, at: SourcePos, code: ErrorCode, message: String) -> RobbieError {
        self.tokens.error_at(at, RobbieError::new(code, message))
    }

    /// Attach the script location `at` to an agent failure.
    pub(crate) fn located<T>(&self, at: SourcePos, result: Result<T>) -> Result<T> {
        result.map_err(|err| self.tokens.error_at(at, err))
    }

    /// `name := [A-Za-z_]+`
    pub(crate) fn parse_name(&mut self) -> Result<String> {
        let at = self.tokens.position();
        match self.tokens.next()? {
            Token::Word(w) if is_name(&w) => Ok(w),
            other => Err(self.fail(
                at,
                ErrorCode::BAD_NAME,
                format!(
                    "invalid name '{other}': names may only contain letters and underscores"
                ),
            )),
        }
    }

    /// `integer := [0-9]+`
    pub(crate) fn parse_integer(&mut self) -> Result<u32> {
        let at = self.tokens.position();
        let token = self.tokens.next()?;
        let digits = match &token {
            Token::Word(w) if !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit()) => w,
            _ => {
                return Err(self.fail(
                    at,
                    ErrorCode::BAD_INTEGER,
                    format!("expected an integer but found '{token}'"),
                ));
            }
        };
        digits.parse().map_err(|_| {
            self.fail(
                at,
                ErrorCode::BAD_INTEGER,
                format!("integer '{digits}' is out of range"),
            )
        })
    }

    /// A quoted string, quotes already stripped by the tokenizer.
    pub(crate) fn parse_string(&mut self) -> Result<String> {
        let at = self.tokens.position();
        match self.tokens.next()? {
            Token::Str(s) => Ok(s),
            other => Err(self.fail(
                at,
                ErrorCode::BAD_STRING,
                format!("expected a string but found '{other}'; strings must be quoted"),
            )),
        }
    }
}

fn is_name(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_alphabetic() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_name() {
        assert!(is_name("walk"));
        assert!(is_name("go_home"));
        assert!(is_name("_"));
        assert!(!is_name("walk2"));
        assert!(!is_name("a-b"));
        assert!(!is_name(""));
    }
}
