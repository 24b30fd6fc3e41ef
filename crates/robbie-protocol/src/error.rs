//! Protocol error types.

use robbie_types::{ErrorCode, RobbieError};
use thiserror::Error;

/// Errors raised while talking to the agent.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// No response arrived before the message deadline.
    #[error("no response to '{request}' within {timeout_ms} ms")]
    Timeout { request: String, timeout_ms: u128 },

    /// The agent answered `CMDFAIL`: the parameters were rejected.
    #[error("'{request}' failed: the agent rejected its parameters (CMDFAIL)")]
    CommandFailed { request: String },

    /// The agent answered `CMDERR`: it did not recognize the command.
    #[error("'{request}' is not a command the agent recognizes (CMDERR)")]
    NotRecognized { request: String },

    /// The response did not match the acknowledgement or prefix expected.
    #[error("expected '{expected}' in response to '{request}' but received '{found}'")]
    UnexpectedResponse {
        request: String,
        expected: String,
        found: String,
    },

    /// The response had the right shape but its fields could not be read.
    #[error("malformed response to '{request}': '{response}'")]
    Malformed { request: String, response: String },

    /// Taking gems would push the held count past `u32::MAX`.
    #[error("cannot take {found} gems while holding {held}: the count would overflow")]
    GemOverflow { held: u32, found: u8 },

    /// The connection could not be made or was lost.
    #[error("connection error: {0}")]
    Connection(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// The structured error code this maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::TIMEOUT,
            Self::CommandFailed { .. } => ErrorCode::COMMAND_FAILED,
            Self::NotRecognized { .. } => ErrorCode::COMMAND_NOT_RECOGNIZED,
            Self::UnexpectedResponse { .. } => ErrorCode::UNEXPECTED_RESPONSE,
            Self::Malformed { .. } => ErrorCode::MALFORMED_RESPONSE,
            Self::GemOverflow { .. } => ErrorCode::GEM_COUNT_OVERFLOW,
            Self::Connection(_) | Self::Io(_) => ErrorCode::CONNECTION,
        }
    }
}

impl From<ProtocolError> for RobbieError {
    fn from(err: ProtocolError) -> Self {
        RobbieError::new(err.code(), err.to_string())
    }
}

/// Protocol result type alias.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
