//! Marionette connection and command round trip.
//!
//! A [`Connection`] owns one socket. It reads the greeting on connect,
//! fixes the wire [`Dialect`] from it, and then runs strictly one command
//! at a time:
//!
//! ```text
//! send(name, params)
//!   → encode (dialect) → write frame
//!   → read frame       → decode (dialect)
//!   → check message id → translate driver error
//! ```
//!
//! # Concurrency
//!
//! `send` takes `&mut self`, so only one command can be in flight. Callers
//! that need to share a connection must serialize access themselves, e.g.
//! behind a `tokio::sync::Mutex`, or open one connection per task.
//!
//! If a `send` future is dropped before its reply is read, the reply would
//! still arrive later and desynchronize the stream. The connection remembers
//! the abandoned command and refuses further sends.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{MessageId, SessionId};
use crate::protocol::{
    Command, Dialect, Greeting, ProtocolVersion, RawResponse, Response,
};
use crate::session::Session;

use super::frame::{read_frame, write_frame};
use super::options::ConnectionOptions;

// ============================================================================
// Constants
// ============================================================================

/// Longest payload excerpt written to trace logs.
const TRACE_PREVIEW_LEN: usize = 512;

/// Command names that create a session.
const NEW_SESSION_COMMANDS: &[&str] = &["newSession", "WebDriver:NewSession"];

/// Command names that end a session.
const DELETE_SESSION_COMMANDS: &[&str] = &["deleteSession", "WebDriver:DeleteSession"];

// ============================================================================
// State
// ============================================================================

/// Round-trip state of the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Ready for the next command.
    Idle,
    /// Command written, reply not yet read.
    InFlight { command: String },
    /// Transport failed; the stream position is unknown.
    Broken { reason: String },
}

// ============================================================================
// Connection
// ============================================================================

/// Connection to a Marionette server.
///
/// Generic over the stream so tests can drive it with in-memory fakes;
/// [`Connection::connect`] opens a TCP socket.
pub struct Connection<S> {
    /// Buffered socket (writes pass straight through).
    stream: BufReader<S>,
    /// Greeting received on connect.
    greeting: Greeting,
    /// Dialect fixed by the greeting.
    dialect: Dialect,
    /// Id for the next current-dialect command; `None` once exhausted.
    next_message_id: Option<MessageId>,
    /// Session learned from `newSession`.
    session: Session,
    /// Transport settings.
    options: ConnectionOptions,
    /// Round-trip state.
    state: State,
}

impl<S> fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("greeting", &self.greeting)
            .field("dialect", &self.dialect)
            .field("next_message_id", &self.next_message_id)
            .field("session", &self.session)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Connection<TcpStream> {
    /// Dials `host:port` with default options and reads the greeting.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the dial fails
    /// - [`Error::Protocol`] if the greeting is malformed or unsupported
    /// - [`Error::Frame`] if the greeting frame is malformed
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        Self::connect_with(host, port, ConnectionOptions::default()).await
    }

    /// Dials `host:port` with custom options and reads the greeting.
    ///
    /// No retry is attempted. On any failure the socket is dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the options are invalid
    /// - [`Error::Connection`] if the dial fails
    /// - [`Error::ConnectionTimeout`] if the dial exceeds `connect_timeout`
    /// - [`Error::RequestTimeout`] if the greeting exceeds `read_timeout`
    /// - [`Error::Protocol`] if the greeting is malformed, unsupported or
    ///   never arrives
    pub async fn connect_with(host: &str, port: u16, options: ConnectionOptions) -> Result<Self> {
        options.validate()?;

        let dial = TcpStream::connect((host, port));
        let dialed = match options.connect_timeout {
            Some(limit) => timeout(limit, dial)
                .await
                .map_err(|_| Error::connection_timeout(millis(limit)))?,
            None => dial.await,
        };

        let stream = dialed.map_err(|e| dial_error(host, port, &e))?;
        stream
            .set_nodelay(true)
            .map_err(|e| dial_error(host, port, &e))?;

        debug!(host, port, "TCP connection established");

        Self::handshake(stream, options).await
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Reads the greeting from an already-open stream.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the options are invalid
    /// - [`Error::RequestTimeout`] if the greeting exceeds `read_timeout`
    /// - [`Error::Protocol`] if the greeting frame is malformed, the stream
    ///   ends before it, or its version is unsupported
    /// - [`Error::Io`] on socket failure
    pub async fn handshake(stream: S, options: ConnectionOptions) -> Result<Self> {
        options.validate()?;

        let mut stream = BufReader::new(stream);
        let payload = with_deadline(
            options.read_timeout,
            "handshake",
            read_frame(&mut stream, options.max_frame_size),
        )
        .await
        .map_err(greeting_error)?;

        trace!(payload = %Preview(&payload), "Greeting received");

        let greeting = Greeting::parse(&payload)?;
        let dialect = Dialect::from(greeting.protocol_version);

        debug!(
            application_type = %greeting.application_type,
            protocol = %greeting.protocol_version,
            ?dialect,
            "Handshake completed"
        );

        Ok(Self {
            stream,
            greeting,
            dialect,
            next_message_id: Some(MessageId::new(options.initial_message_id)),
            session: Session::default(),
            options,
            state: State::Idle,
        })
    }

    /// Sends a command and returns its successful reply.
    ///
    /// A successful `newSession` records the session id and capabilities;
    /// a successful `deleteSession` clears them.
    ///
    /// # Errors
    ///
    /// - [`Error::Driver`] if the remote end failed the command (the
    ///   connection stays usable)
    /// - any error from [`Connection::send_raw`]
    pub async fn send(&mut self, name: &str, params: Value) -> Result<Response> {
        let response = self.send_raw(name, params).await?.into_result()?;
        self.observe_session(name, &response);
        Ok(response)
    }

    /// Sends a command and returns the decoded reply without translating
    /// remote failures into errors.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionUnusable`] if an earlier round trip failed or
    ///   was abandoned
    /// - [`Error::Io`], [`Error::Frame`], [`Error::ConnectionClosed`] or
    ///   [`Error::RequestTimeout`] if the round trip fails
    /// - [`Error::UnexpectedMessageId`] if the reply answers another command
    /// - [`Error::Json`] / [`Error::Protocol`] if the reply cannot be decoded
    ///
    /// All but the decode errors leave the connection unusable.
    pub async fn send_raw(&mut self, name: &str, params: Value) -> Result<RawResponse> {
        self.ensure_idle()?;

        let mut command = Command::new(name, params);
        let expected_id = if self.dialect.uses_message_ids() {
            let id = self.allocate_message_id()?;
            command = command.with_id(id);
            Some(id)
        } else {
            None
        };

        let payload = self.dialect.encode(&command)?;
        trace!(command = name, id = ?expected_id, payload = %Preview(&payload), "Sending command");

        self.state = State::InFlight {
            command: name.to_string(),
        };

        let reply = match self.round_trip(name, &payload).await {
            Ok(reply) => reply,
            Err(e) => {
                self.mark_broken(format!("{name} failed: {e}"));
                return Err(e);
            }
        };

        self.state = State::Idle;
        trace!(command = name, len = reply.len(), payload = %Preview(&reply), "Reply received");

        let raw = self.dialect.decode(&reply)?;

        if let (Some(expected), Some(received)) = (expected_id, raw.message_id)
            && expected != received
        {
            warn!(%expected, %received, command = name, "Reply message id mismatch");
            self.mark_broken(format!(
                "reply to message {expected} carried id {received}"
            ));
            return Err(Error::unexpected_message_id(expected, received));
        }

        Ok(raw)
    }

    /// Shuts down the socket.
    ///
    /// Dropping the connection also closes it; this variant reports
    /// shutdown errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the shutdown fails.
    pub async fn close(self) -> Result<()> {
        let mut stream = self.stream.into_inner();
        stream.shutdown().await?;
        debug!("Connection closed");
        Ok(())
    }

    /// Writes the command frame and reads the reply frame.
    async fn round_trip(&mut self, name: &str, payload: &[u8]) -> Result<Vec<u8>> {
        write_frame(&mut self.stream, payload).await?;

        let read_timeout = self.options.read_timeout;
        let max_frame_size = self.options.max_frame_size;
        with_deadline(
            read_timeout,
            name,
            read_frame(&mut self.stream, max_frame_size),
        )
        .await
    }
}

// ============================================================================
// State Management
// ============================================================================

impl<S> Connection<S> {
    fn ensure_idle(&self) -> Result<()> {
        match &self.state {
            State::Idle => Ok(()),
            State::InFlight { command } => Err(Error::connection_unusable(format!(
                "reply to abandoned {command} was never read"
            ))),
            State::Broken { reason } => Err(Error::connection_unusable(reason.clone())),
        }
    }

    fn mark_broken(&mut self, reason: String) {
        debug!(%reason, "Connection marked unusable");
        self.state = State::Broken { reason };
    }

    fn allocate_message_id(&mut self) -> Result<MessageId> {
        let id = self
            .next_message_id
            .ok_or_else(|| Error::protocol("message id space exhausted"))?;
        self.next_message_id = id.next();
        Ok(id)
    }

    fn observe_session(&mut self, name: &str, response: &Response) {
        if NEW_SESSION_COMMANDS.contains(&name) {
            if let Some(current) = self.session.id() {
                warn!(session_id = %current, "Session already active, keeping existing id");
                return;
            }

            match Session::from_new_session(&response.value) {
                Some(session) => {
                    if let Some(id) = session.id() {
                        debug!(session_id = %id, "Session created");
                    }
                    self.session = session;
                }
                None => warn!(command = name, "Session reply carried no session id"),
            }
        } else if DELETE_SESSION_COMMANDS.contains(&name) {
            debug!("Session deleted");
            self.session = Session::default();
        }
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl<S> Connection<S> {
    /// Returns the session id, or `None` before `newSession` succeeds.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session.id()
    }

    /// Returns the current session.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the greeting received on connect.
    #[inline]
    #[must_use]
    pub fn greeting(&self) -> &Greeting {
        &self.greeting
    }

    /// Returns the negotiated protocol version.
    #[inline]
    #[must_use]
    pub fn protocol_version(&self) -> ProtocolVersion {
        self.greeting.protocol_version
    }

    /// Returns the active wire dialect.
    #[inline]
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the connection's options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Returns `true` if the connection can carry another command.
    #[inline]
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.state == State::Idle
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Runs `future` under an optional deadline.
/// Maps a dial or socket setup failure into the connect error family.
fn dial_error(host: &str, port: u16, e: &std::io::Error) -> Error {
    Error::connection(format!("{host}:{port}: {e}"))
}

/// A greeting that cannot be framed is a protocol failure.
fn greeting_error(e: Error) -> Error {
    match e {
        Error::Frame { message } => Error::protocol(format!("malformed greeting frame: {message}")),
        Error::ConnectionClosed => Error::protocol("connection closed before greeting"),
        other => other,
    }
}

async fn with_deadline<T>(
    limit: Option<Duration>,
    command: &str,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        Some(limit) => timeout(limit, future)
            .await
            .map_err(|_| Error::request_timeout(command, millis(limit)))?,
        None => future.await,
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Lazily formatted payload excerpt for trace logs.
struct Preview<'a>(&'a [u8]);

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.len().min(TRACE_PREVIEW_LEN);
        f.write_str(&String::from_utf8_lossy(&self.0[..end]))?;
        if end < self.0.len() {
            write!(f, "... ({} bytes)", self.0.len())?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
