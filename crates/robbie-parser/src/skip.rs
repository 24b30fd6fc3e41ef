//! Structural skipping of code that is not executed.
//!
//! Skipped code is checked only as far as needed to find where it ends.
//! The agent is never consulted and procedure names are not resolved.

use robbie_types::{ErrorCode, Result, RobbieError};

use crate::parser::Interpreter;

impl<'a> Interpreter<'a> {
    /// Skip a `body`: a braced block or a single instruction.
    pub(crate) fn skip_body(&mut self) -> Result<()> {
        if self.tokens.peek_is("{")? {
            self.skip_block()
        } else {
            self.skip_instruction()
        }
    }

    /// Skip from `{` to its matching `}` by counting brace depth.
    pub(crate) fn skip_block(&mut self) -> Result<()> {
        self.tokens.eat("{")?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.tokens.next()?;
            if token.is("{") {
                depth += 1;
            } else if token.is("}") {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Skip one instruction.
    ///
    /// Flat instructions end at their `;`. `if`, `while` and `do` own a
    /// body that may be a braced block, so they are skipped by their shape.
    fn skip_instruction(&mut self) -> Result<()> {
        let head = self.tokens.peek()?;
        match head.as_word() {
            Some("if") => {
                self.tokens.next()?;
                self.read_test()?;
                self.skip_body()?;
                if self.tokens.peek_is("else")? {
                    self.tokens.next()?;
                    self.skip_body()?;
                }
                Ok(())
            }
            Some("while") => {
                self.tokens.next()?;
                self.read_test()?;
                self.skip_body()
            }
            Some("do") => {
                self.tokens.next()?;
                self.parse_integer()?;
                self.skip_body()
            }
            _ => self.skip_to_semicolon(),
        }
    }

    fn skip_to_semicolon(&mut self) -> Result<()> {
        loop {
            let at = self.tokens.position();
            let token = self.tokens.next()?;
            if token.is(";") {
                return Ok(());
            }
            if token.is("{") || token.is("}") {
                return Err(self.tokens.error_at(at, RobbieError::unexpected(";", &token)));
            }
        }
    }
}
