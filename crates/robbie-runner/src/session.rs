//! One connection, one script.

use robbie_lexer::SourceCursor;
use robbie_parser::Interpreter;
use robbie_protocol::{CommandInterface, ProtocolResult, TcpTransport, Transport};
use robbie_types::{AgentCommands, ErrorCode, Result, RobbieError};
use std::io::Write;
use std::path::Path;

use crate::config::SessionConfig;

/// An agent connection prepared for running a script.
///
/// Opening sends `SHOWMSGS` and, when a grid is configured, `LOADGRID`.
/// A failed run still tries to stop the agent before the error is returned.
pub struct Session<T: Transport> {
    agent: CommandInterface<T>,
    max_call_depth: u32,
}

impl Session<TcpTransport> {
    /// Connect over TCP, retrying as configured, and open a session.
    pub fn connect(config: &SessionConfig) -> Result<Self> {
        let transport = TcpTransport::connect(&config.connect_options())?;
        Self::open(transport, config)
    }
}

impl<T: Transport> Session<T> {
    /// Prepare the agent on an established transport.
    pub fn open(transport: T, config: &SessionConfig) -> Result<Self> {
        let mut agent = CommandInterface::with_config(transport, config.adapter_config());
        if let Err(err) = prepare(&mut agent, config) {
            stop_quietly(&mut agent);
            if let Err(close_err) = agent.close() {
                tracing::warn!(error = %close_err, "could not close the transport after a failure");
            }
            return Err(err.into());
        }
        tracing::info!(grid = ?config.grid, "session open");
        Ok(Self {
            agent,
            max_call_depth: config.max_call_depth,
        })
    }

    /// The adapter driving the agent.
    pub fn agent(&self) -> &CommandInterface<T> {
        &self.agent
    }

    /// Interpret `source`, sending `print` output to `out`.
    ///
    /// On failure the agent is told to stop, and the interpreter's error is
    /// returned whether or not that worked.
    ///
    /// Procedure calls recurse on the calling thread; it needs
    /// [`SessionConfig::interpreter_stack_size`] bytes of stack for the
    /// depth limit to trip before the stack runs out.
    pub fn run(&mut self, source: SourceCursor, out: &mut dyn Write) -> Result<()> {
        let script = source.name().to_string();
        let result = Interpreter::new(source, &mut self.agent, out)
            .with_max_call_depth(self.max_call_depth)
            .run();
        match result {
            Ok(()) => {
                tracing::info!(script = %script, "run complete");
                Ok(())
            }
            Err(err) => {
                tracing::debug!(script = %script, error = %err, "run failed");
                stop_quietly(&mut self.agent);
                Err(err)
            }
        }
    }

    /// Release the transport.
    pub fn close(mut self) -> Result<()> {
        self.agent.close()?;
        tracing::info!("session closed");
        Ok(())
    }
}

fn prepare<T: Transport>(agent: &mut CommandInterface<T>, config: &SessionConfig) -> ProtocolResult<()> {
    agent.set_show_messages(config.show_messages)?;
    if let Some(grid) = &config.grid {
        agent.load_grid(grid)?;
    }
    Ok(())
}

fn stop_quietly<T: Transport>(agent: &mut CommandInterface<T>) {
    if let Err(err) = agent.stop() {
        tracing::warn!(error = %err, "could not stop the agent after a failure");
    }
}

/// Open a session on `transport`, run `source`, and close.
///
/// The transport is closed even when the run fails; the run's error wins
/// over a failure to close.
pub fn run_script<T: Transport>(
    source: SourceCursor,
    transport: T,
    config: &SessionConfig,
    out: &mut dyn Write,
) -> Result<()> {
    config.validate()?;
    let mut session = Session::open(transport, config)?;
    let result = session.run(source, out);
    let closed = session.close();
    result.and(closed)
}

/// Load a script file.
pub fn read_script(path: impl AsRef<Path>) -> Result<SourceCursor> {
    let path = path.as_ref();
    SourceCursor::from_path(path).map_err(|err| {
        RobbieError::new(
            ErrorCode::SOURCE_UNREADABLE,
            format!("cannot read script {}: {err}", path.display()),
        )
    })
}
