//! Transport that replays a fixed conversation.

use std::collections::VecDeque;
use std::time::Duration;

use super::Transport;
use crate::error::{ProtocolError, ProtocolResult};

/// Expects an exact sequence of request lines and answers each with a
/// canned response. A request that does not match the script is an error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<(String, Option<String>)>,
    /// Response to hand out on the next receive.
    pending: Option<Option<String>>,
    sent: Vec<String>,
    closed: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect `request`, answer with `response`.
    pub fn expect(mut self, request: &str, response: &str) -> Self {
        self.script
            .push_back((request.to_string(), Some(response.to_string())));
        self
    }

    /// Expect `request`, then stay silent so the receive times out.
    pub fn expect_silence(mut self, request: &str) -> Self {
        self.script.push_back((request.to_string(), None));
        self
    }

    /// Every line sent so far.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    /// `true` once every scripted exchange has happened.
    pub fn is_finished(&self) -> bool {
        self.script.is_empty() && self.pending.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for ScriptedTransport {
    fn send_line(&mut self, line: &str) -> ProtocolResult<()> {
        if self.closed {
            return Err(ProtocolError::Connection("transport is closed".into()));
        }
        self.sent.push(line.to_string());
        match self.script.pop_front() {
            Some((expected, response)) if expected == line => {
                self.pending = Some(response);
                Ok(())
            }
            Some((expected, _)) => Err(ProtocolError::Connection(format!(
                "scripted transport expected '{expected}' but got '{line}'"
            ))),
            None => Err(ProtocolError::Connection(format!(
                "scripted transport got '{line}' after the script ended"
            ))),
        }
    }

    fn receive_line(&mut self, _timeout: Duration) -> ProtocolResult<Option<String>> {
        match self.pending.take() {
            Some(response) => Ok(response),
            None => Err(ProtocolError::Connection(
                "scripted transport has nothing to answer".into(),
            )),
        }
    }

    fn close(&mut self) -> ProtocolResult<()> {
        self.closed = true;
        Ok(())
    }
}
