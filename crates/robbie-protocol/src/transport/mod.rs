//! Line transports.
//!
//! The adapter only needs to send a line, wait a bounded time for one line
//! back, and close. [`TcpTransport`] does this over a socket; the scripted
//! and in-memory transports stand in for a live agent in tests.

mod memory;
mod scripted;
mod tcp;

pub use memory::{GridWorld, MemoryTransport};
pub use scripted::ScriptedTransport;
pub use tcp::{ConnectOptions, TcpTransport, DEFAULT_PORT};

use crate::error::ProtocolResult;
use std::time::Duration;

/// A bidirectional line channel.
pub trait Transport {
    /// Send one line. The terminator is added by the transport.
    fn send_line(&mut self, line: &str) -> ProtocolResult<()>;

    /// Wait up to `timeout` for one line, without its terminator.
    /// `None` means the deadline passed.
    fn receive_line(&mut self, timeout: Duration) -> ProtocolResult<Option<String>>;

    fn close(&mut self) -> ProtocolResult<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_line(&mut self, line: &str) -> ProtocolResult<()> {
        (**self).send_line(line)
    }

    fn receive_line(&mut self, timeout: Duration) -> ProtocolResult<Option<String>> {
        (**self).receive_line(timeout)
    }

    fn close(&mut self) -> ProtocolResult<()> {
        (**self).close()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_line(&mut self, line: &str) -> ProtocolResult<()> {
        (**self).send_line(line)
    }

    fn receive_line(&mut self, timeout: Duration) -> ProtocolResult<Option<String>> {
        (**self).receive_line(timeout)
    }

    fn close(&mut self) -> ProtocolResult<()> {
        (**self).close()
    }
}
