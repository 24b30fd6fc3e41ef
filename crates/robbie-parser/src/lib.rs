//! Robbie interpreter: recognizes and executes a script in one descent.
//!
//! No syntax tree is built. Loops and procedure calls replay script text
//! by seeking the tokenizer back to a saved position, and branches that are
//! not taken are skipped structurally without touching the agent.

mod parse_instr;
mod parse_program;
mod parser;
mod procs;
mod skip;

pub use parser::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
pub use procs::ProcTable;
