//! Program-level parsing: procedure declarations and `main`.

use robbie_lexer::Token;
use robbie_types::{ErrorCode, Result};

use crate::parser::Interpreter;

impl<'a> Interpreter<'a> {
    /// Run the whole script.
    ///
    /// `program := proc_decl* "main" block`
    ///
    /// Declarations are recorded first, then `main` executes, then the agent
    /// is told to stop. Nothing after `main`'s closing brace is read.
    pub fn run(&mut self) -> Result<()> {
        self.declare_procedures()?;

        self.tokens.eat("main")?;
        tracing::trace!(procedures = self.procs.len(), "entering main");
        self.parse_block()?;

        let end = self.tokens.position();
        let stopped = self.agent.stop();
        self.located(end, stopped)?;
        tracing::debug!("script finished");
        Ok(())
    }

    /// `proc_decl := "proc" name block`, repeated while the next word is
    /// `proc`. Bodies are skipped, only their position is kept.
    fn declare_procedures(&mut self) -> Result<()> {
        while self.tokens.peek_is("proc")? {
            self.tokens.next()?;
            let name = self.parse_name()?;
            let body = self.tokens.position();
            if !self.tokens.peek_is("{")? {
                let token = self.tokens.peek()?;
                return Err(self.fail(
                    body,
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected '{{' to open procedure '{name}' but found '{token}'"),
                ));
            }
            self.skip_block()?;
            if self.procs.declare(name.as_str(), body) {
                tracing::debug!(name = %name, "procedure redeclared");
            } else {
                tracing::trace!(name = %name, offset = body.offset(), "procedure declared");
            }
        }

        if let Token::Eof = self.tokens.peek()? {
            return Err(self.tokens.error(
                ErrorCode::UNEXPECTED_EOF,
                "reached end of input before 'main'",
            ));
        }
        Ok(())
    }
}
