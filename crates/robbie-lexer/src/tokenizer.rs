//! On-demand tokenizer over a [`SourceCursor`].
//!
//! There is no token vector: every call scans straight from the cursor.
//! `peek` scans and then seeks back, so it costs one full token scan and
//! never moves the read position.
//!
//! Scanning order:
//! - whitespace is skipped
//! - `; { } ! ( ) ,` are single-character tokens
//! - `"` starts a string (escapes `\n \t \b \r \f \\ \" \'`)
//! - `//` and `/* */` comments are discarded
//! - anything else is a bare run up to whitespace, `;`, `{`, `}` or the end

use robbie_types::{ErrorCode, Location, Result, RobbieError};

use crate::cursor::{SourceCursor, SourcePos};
use crate::token::{Token, PUNCTUATION};

/// The Robbie tokenizer.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    cursor: SourceCursor,
}

impl Tokenizer {
    /// Create a tokenizer reading from `cursor`'s current position.
    pub fn new(cursor: SourceCursor) -> Self {
        Self { cursor }
    }

    /// Convenience constructor for in-memory scripts.
    pub fn from_source(name: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        Self::new(SourceCursor::new(name, source))
    }

    pub fn cursor(&self) -> &SourceCursor {
        &self.cursor
    }

    // ── Token queue ──────────────────────────────────────────────────────

    /// Return the next token without consuming it.
    ///
    /// Idempotent: the read position is restored even when the scan fails.
    pub fn peek(&mut self) -> Result<Token> {
        let saved = self.cursor.position();
        let token = self.scan();
        self.cursor.seek(saved);
        token
    }

    /// Consume and return the next token.
    ///
    /// Fails with `UNEXPECTED_EOF` when nothing is left: every well-formed
    /// script ends on a `}`, so running dry means a block was never closed.
    pub fn next(&mut self) -> Result<Token> {
        let token = self.scan()?;
        if token.is_eof() {
            return Err(self.error(
                ErrorCode::UNEXPECTED_EOF,
                "reached end of input while parsing; missing '}'?",
            ));
        }
        Ok(token)
    }

    /// Consume the next token and check that it is spelled `expected`.
    pub fn eat(&mut self, expected: &str) -> Result<()> {
        let start = self.cursor.position();
        let token = self.next()?;
        if token.is(expected) {
            Ok(())
        } else {
            Err(self.error_at(start, RobbieError::unexpected(expected, &token)))
        }
    }

    /// `true` if the next token is spelled `text`.
    pub fn peek_is(&mut self, text: &str) -> Result<bool> {
        Ok(self.peek()?.is(text))
    }

    // ── Seeking ──────────────────────────────────────────────────────────

    pub fn position(&self) -> SourcePos {
        self.cursor.position()
    }

    pub fn seek(&mut self, pos: SourcePos) {
        tracing::trace!(from = self.cursor.position().offset(), to = pos.offset(), "seek");
        self.cursor.seek(pos);
    }

    // ── Errors ───────────────────────────────────────────────────────────

    /// Build an error located at the current read position.
    pub fn error(&self, code: ErrorCode, message: impl Into<String>) -> RobbieError {
        self.error_at(self.cursor.position(), RobbieError::new(code, message))
    }

    /// Locate `err` at `pos`, unless it already carries a location.
    pub fn error_at(&self, pos: SourcePos, err: RobbieError) -> RobbieError {
        if !err.is_unlocated() {
            return err;
        }
        let location = self.next_token_location(pos);
        let line = self.cursor.line_text(location.line).unwrap_or_default();
        err.at(location, line)
    }

    /// Location of the first non-blank byte at or after `pos`, so errors
    /// point at the offending token rather than the whitespace before it.
    fn next_token_location(&self, pos: SourcePos) -> Location {
        let mut ahead = self.cursor.clone();
        ahead.seek(pos);
        while ahead.peek().is_some_and(is_space) {
            ahead.advance();
        }
        ahead.location()
    }

    // ── Scanning ─────────────────────────────────────────────────────────

    fn scan(&mut self) -> Result<Token> {
        loop {
            self.skip_whitespace();

            let Some(ch) = self.cursor.peek() else {
                return Ok(Token::Eof);
            };

            if PUNCTUATION.contains(&ch) {
                self.cursor.advance();
                return Ok(Token::Punct(ch as char));
            }

            if ch == b'"' {
                return self.scan_string();
            }

            if ch == b'/' && self.skip_comment()? {
                continue;
            }

            return Ok(self.scan_word());
        }
    }

    fn skip_whitespace(&mut self) {
        while self.cursor.peek().is_some_and(is_space) {
            self.cursor.advance();
        }
    }

    /// Skip a `//` or `/* */` comment starting at the current `/`.
    /// Returns `false`, without consuming anything, if the `/` does not
    /// start a comment.
    fn skip_comment(&mut self) -> Result<bool> {
        match self.cursor.peek_at(1) {
            Some(b'/') => {
                while let Some(ch) = self.cursor.advance() {
                    if ch == b'\n' {
                        break;
                    }
                }
                Ok(true)
            }
            Some(b'*') => {
                let start = self.cursor.position();
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    match self.cursor.advance() {
                        None => {
                            return Err(self.error_at(
                                start,
                                RobbieError::new(
                                    ErrorCode::UNTERMINATED_COMMENT,
                                    "end of input reached inside '/*' comment",
                                ),
                            ));
                        }
                        Some(b'*') if self.cursor.peek() == Some(b'/') => {
                            self.cursor.advance();
                            return Ok(true);
                        }
                        Some(_) => {}
                    }
                }
            }
            _ => Ok(false),
        }
    }

    /// Scan a string literal; the cursor is on the opening `"`.
    fn scan_string(&mut self) -> Result<Token> {
        let start = self.cursor.position();
        self.cursor.advance();
        let mut buf = Vec::new();

        loop {
            match self.cursor.advance() {
                Some(b'"') => break,
                Some(b'\n') => {
                    return Err(self.error_at(
                        start,
                        RobbieError::new(
                            ErrorCode::UNTERMINATED_STRING,
                            format!(
                                "end of line reached while parsing string \"{}",
                                String::from_utf8_lossy(&buf)
                            ),
                        ),
                    ));
                }
                None => {
                    return Err(self.error_at(
                        start,
                        RobbieError::new(
                            ErrorCode::UNTERMINATED_STRING,
                            "end of input reached while parsing string",
                        ),
                    ));
                }
                Some(b'\\') => buf.push(self.scan_escape()?),
                Some(ch) => buf.push(ch),
            }
        }

        Ok(Token::Str(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Resolve the character after a `\`.
    fn scan_escape(&mut self) -> Result<u8> {
        let at = self.cursor.position();
        let resolved = match self.cursor.peek() {
            Some(b'n') => b'\n',
            Some(b't') => b'\t',
            Some(b'b') => 0x08,
            Some(b'r') => b'\r',
            Some(b'f') => 0x0c,
            Some(b'\\') => b'\\',
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            Some(other) => {
                return Err(self.error_at(
                    at,
                    RobbieError::new(
                        ErrorCode::BAD_ESCAPE,
                        format!("unrecognized escape sequence '\\{}'", other as char),
                    ),
                ));
            }
            None => {
                return Err(self.error_at(
                    at,
                    RobbieError::new(
                        ErrorCode::UNTERMINATED_STRING,
                        "end of input reached inside escape sequence",
                    ),
                ));
            }
        };
        self.cursor.advance();
        Ok(resolved)
    }

    /// Greedily take a bare run.
    fn scan_word(&mut self) -> Token {
        let mut buf = Vec::new();
        while let Some(ch) = self.cursor.peek() {
            if is_space(ch) || matches!(ch, b';' | b'{' | b'}') {
                break;
            }
            buf.push(ch);
            self.cursor.advance();
        }
        Token::Word(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn is_space(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}
