//! Instruction parsing and execution.

use robbie_lexer::{SourcePos, Token};
use robbie_types::{ErrorCode, Result, RobbieError};
use std::io::Write;

use crate::parser::Interpreter;

impl<'a> Interpreter<'a> {
    /// `block := "{" instruction* "}"`
    pub(crate) fn parse_block(&mut self) -> Result<()> {
        self.tokens.eat("{")?;
        while !self.tokens.peek_is("}")? {
            self.parse_instruction()?;
        }
        self.tokens.eat("}")
    }

    /// `body := block | instruction`
    pub(crate) fn parse_body(&mut self) -> Result<()> {
        if self.tokens.peek_is("{")? {
            self.parse_block()
        } else {
            self.parse_instruction()
        }
    }

    /// Parse and execute one instruction.
    pub(crate) fn parse_instruction(&mut self) -> Result<()> {
        let at = self.tokens.position();
        let token = self.tokens.next()?;
        let Some(word) = token.as_word() else {
            return Err(self.unknown_instruction(at, &token));
        };
        tracing::trace!(instruction = word, offset = at.offset(), "execute");

        match word {
            "step" | "turnL" | "turnR" | "take" | "drop" => self.parse_commands(at, &token),
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "do" => self.parse_do(),
            "call" => self.parse_call(),
            "init" => self.parse_init(),
            "print" => self.parse_print(),
            _ => Err(self.unknown_instruction(at, &token)),
        }
    }

    fn unknown_instruction(&self, at: SourcePos, token: &Token) -> RobbieError {
        self.fail(
            at,
            ErrorCode::UNKNOWN_INSTRUCTION,
            format!("'{token}' is not a recognized instruction"),
        )
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// `commands := command+ ";"`
    ///
    /// Each command runs as soon as it is read, so `step step` followed by
    /// garbage has already moved twice when the error is raised.
    fn parse_commands(&mut self, first_at: SourcePos, first: &Token) -> Result<()> {
        self.run_command(first_at, first)?;
        loop {
            let at = self.tokens.position();
            let token = self.tokens.next()?;
            if token.is(";") {
                return Ok(());
            }
            self.run_command(at, &token)?;
        }
    }

    fn run_command(&mut self, at: SourcePos, token: &Token) -> Result<()> {
        let result = match token.as_word() {
            Some("step") => self.agent.move_forward(),
            Some("turnL") => self.agent.turn_left(),
            Some("turnR") => self.agent.turn_right(),
            Some("take") => self.agent.take_adjacent(),
            Some("drop") => self.agent.drop_adjacent(),
            _ => {
                return Err(self.fail(
                    at,
                    ErrorCode::UNKNOWN_COMMAND,
                    format!("expected a command or ';' but found '{token}'"),
                ));
            }
        };
        self.located(at, result)
    }

    // ── Control flow ──────────────────────────────────────────────────────────

    /// `if := "if" test body ["else" body]`
    fn parse_if(&mut self) -> Result<()> {
        let cond = self.parse_test()?;
        if cond {
            self.parse_body()?;
        } else {
            self.skip_body()?;
        }

        if self.tokens.peek_is("else")? {
            self.tokens.next()?;
            if cond {
                self.skip_body()?;
            } else {
                self.parse_body()?;
            }
        }
        Ok(())
    }

    /// `while := "while" test body`
    ///
    /// The test is re-read and re-evaluated before every pass.
    fn parse_while(&mut self) -> Result<()> {
        let test = self.tokens.position();
        loop {
            if !self.parse_test()? {
                return self.skip_body();
            }
            self.parse_body()?;
            self.tokens.seek(test);
        }
    }

    /// `do := "do" integer body`
    fn parse_do(&mut self) -> Result<()> {
        let count = self.parse_integer()?;
        let body = self.tokens.position();
        if count == 0 {
            return self.skip_body();
        }
        for _ in 0..count {
            self.tokens.seek(body);
            self.parse_body()?;
        }
        Ok(())
    }

    /// `call := "call" name ";"`
    ///
    /// Jumps to the procedure body, runs it, and comes back.
    fn parse_call(&mut self) -> Result<()> {
        let at = self.tokens.position();
        let name = self.parse_name()?;
        let Some(body) = self.procs.lookup(&name) else {
            return Err(self.fail(
                at,
                ErrorCode::UNDEFINED_PROCEDURE,
                format!("procedure '{name}' is not declared"),
            ));
        };
        if self.depth >= self.max_call_depth {
            return Err(self.fail(
                at,
                ErrorCode::CALL_DEPTH_EXCEEDED,
                format!(
                    "call to '{name}' exceeds the maximum call depth of {}",
                    self.max_call_depth
                ),
            ));
        }

        let resume = self.tokens.position();
        self.depth += 1;
        self.tokens.seek(body);
        let result = self.parse_block();
        self.depth -= 1;
        result?;
        self.tokens.seek(resume);
        self.tokens.eat(";")
    }

    // ── Directives ────────────────────────────────────────────────────────────

    /// `init := "init" ("grid" (string | word) | "gems" integer) ";"`
    fn parse_init(&mut self) -> Result<()> {
        let at = self.tokens.position();
        let target = self.tokens.next()?;
        match target.as_word() {
            Some("grid") => {
                let name_at = self.tokens.position();
                let filename = match self.tokens.next()? {
                    Token::Str(s) | Token::Word(s) => s,
                    other => {
                        return Err(self.fail(
                            name_at,
                            ErrorCode::BAD_STRING,
                            format!("expected a grid name but found '{other}'"),
                        ));
                    }
                };
                let result = self.agent.init_grid(&filename);
                self.located(at, result)?;
            }
            Some("gems") => {
                let count = self.parse_integer()?;
                let result = self.agent.init_gem_count(count);
                self.located(at, result)?;
            }
            _ => {
                return Err(self.fail(
                    at,
                    ErrorCode::UNKNOWN_INIT_TARGET,
                    format!("'{target}' is not a valid argument for init; expected 'grid' or 'gems'"),
                ));
            }
        }
        self.tokens.eat(";")
    }

    /// `print := "print" string ";"`
    fn parse_print(&mut self) -> Result<()> {
        let text = self.parse_string()?;
        self.tokens.eat(";")?;
        writeln!(self.out, "{text}").map_err(|e| {
            RobbieError::new(
                ErrorCode::OUTPUT_FAILED,
                format!("could not write print output: {e}"),
            )
        })
    }
}
