//! Robbie agent protocol.
//!
//! [`CommandInterface`] turns the interpreter's [`AgentCommands`] calls
//! into request/response exchanges over a line [`Transport`], keeping a
//! [`ShadowState`] of what it has learned about the agent so each fact is
//! asked for at most once.
//!
//! [`AgentCommands`]: robbie_types::AgentCommands

pub mod adapter;
pub mod error;
pub mod shadow;
pub mod transport;
pub mod wire;

pub use adapter::{AdapterConfig, CommandInterface, DEFAULT_MESSAGE_TIMEOUT};
pub use error::{ProtocolError, ProtocolResult};
pub use shadow::ShadowState;
pub use transport::{
    ConnectOptions, GridWorld, MemoryTransport, ScriptedTransport, TcpTransport, Transport,
    DEFAULT_PORT,
};
pub use wire::{Expected, Request, RequestParseError, CMDERR, CMDFAIL};
