//! Token shapes for the Robbie tokenizer.
//!
//! The tokenizer only knows three shapes of lexeme: punctuation, quoted
//! strings and bare words. Whether a bare word is a keyword, a procedure
//! name or an integer is decided by the interpreter from context.

use serde::Serialize;
use std::fmt;

/// Every reserved word of the language.
pub const ALL_KEYWORDS: &[&str] = &[
    // Structure (2)
    "proc", "main",
    // Control flow (5)
    "if", "else", "while", "do", "call",
    // Directives (4)
    "init", "print", "grid", "gems",
    // Commands (5)
    "step", "turnL", "turnR", "take", "drop",
    // Tests (11)
    "leftclear", "rightclear", "frontclear", "backclear", "seejem", "hasjem",
    "facingN", "facingS", "facingE", "facingW", "not",
];

/// Characters that always form a token on their own.
pub const PUNCTUATION: &[u8] = b";{}!(),";

/// A single token. Tokens carry no position; replay is done by seeking the
/// cursor, not by remembering tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Token {
    /// One of `; { } ! ( ) ,`
    Punct(char),
    /// A quoted string, quotes stripped and escapes resolved.
    Str(String),
    /// A bare run: keyword, name, or integer.
    Word(String),
    /// Nothing left to scan.
    Eof,
}

impl Token {
    /// `true` if this is a punctuation or bare word token spelled `text`.
    ///
    /// Strings never match, so `"main"` in quotes is not the keyword.
    pub fn is(&self, text: &str) -> bool {
        match self {
            Token::Punct(c) => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf) == text
            }
            Token::Word(w) => w == text,
            Token::Str(_) | Token::Eof => false,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }

    /// The bare word, if this is one.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Punct(c) => write!(f, "{c}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Word(w) => f.write_str(w),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
