//! TCP transport with connect retry.

use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use super::Transport;
use crate::error::{ProtocolError, ProtocolResult};

/// Port the agent listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 1024;

/// Where and how patiently to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub address: String,
    pub port: u16,
    /// Give up after this long. `None` keeps trying forever.
    pub connect_timeout: Option<Duration>,
    /// Pause between attempts.
    pub retry_interval: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            retry_interval: Duration::from_millis(250),
        }
    }
}

/// A line channel over one TCP connection.
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    peer: String,
    closed: bool,
}

impl TcpTransport {
    /// Connect, retrying until it works or the connect timeout elapses.
    pub fn connect(options: &ConnectOptions) -> ProtocolResult<Self> {
        let started = Instant::now();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            tracing::debug!(
                address = %options.address,
                port = options.port,
                attempt,
                "connecting"
            );
            match TcpStream::connect((options.address.as_str(), options.port)) {
                Ok(stream) => {
                    tracing::info!(address = %options.address, port = options.port, "connected");
                    return Self::from_stream(stream);
                }
                Err(err) => {
                    let gave_up = options
                        .connect_timeout
                        .is_some_and(|limit| started.elapsed() >= limit);
                    if gave_up {
                        return Err(ProtocolError::Connection(format!(
                            "could not connect to {}:{} after {attempt} attempts: {err}",
                            options.address, options.port
                        )));
                    }
                    tracing::debug!(error = %err, "connect failed, retrying");
                    thread::sleep(options.retry_interval);
                }
            }
        }
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> ProtocolResult<Self> {
        stream.set_nodelay(true)?;
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown peer".to_string());
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: BufWriter::new(stream),
            peer,
            closed: false,
        })
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }
}

impl Transport for TcpTransport {
    fn send_line(&mut self, line: &str) -> ProtocolResult<()> {
        if self.closed {
            return Err(ProtocolError::Connection("transport is closed".into()));
        }
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn receive_line(&mut self, timeout: Duration) -> ProtocolResult<Option<String>> {
        if self.closed {
            return Err(ProtocolError::Connection("transport is closed".into()));
        }
        // A zero read timeout is rejected by the socket.
        let timeout = timeout.max(Duration::from_millis(1));
        self.reader.get_ref().set_read_timeout(Some(timeout))?;

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Err(ProtocolError::Connection(format!(
                "connection closed by {}",
                self.peer
            ))),
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']);
                Ok(Some(trimmed.to_string()))
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn close(&mut self) -> ProtocolResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer.flush()?;
        match self.writer.get_ref().shutdown(std::net::Shutdown::Both) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotConnected => {}
            Err(err) => return Err(err.into()),
        }
        tracing::info!(peer = %self.peer, "connection closed");
        Ok(())
    }
}
