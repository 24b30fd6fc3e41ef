//! Robbie runner: configuration and the session pipeline.
//!
//! ```text
//! config → connect → SHOWMSGS / LOADGRID → interpret → STOP → close
//! ```
//!
//! [`run_script`] does the whole thing over any [`Transport`]; the launcher
//! uses [`Session::connect`] for a TCP agent.
//!
//! [`Transport`]: robbie_protocol::Transport

pub mod config;
pub mod session;

pub use config::{ConfigError, SessionConfig, MAX_CALL_DEPTH_LIMIT};
pub use session::{read_script, run_script, Session};
