//! Robbie lexer: turns a seekable source buffer into tokens on demand.

pub mod cursor;
pub mod token;
pub mod tokenizer;

pub use cursor::{SourceCursor, SourcePos};
pub use token::{Token, ALL_KEYWORDS, PUNCTUATION};
pub use tokenizer::Tokenizer;
