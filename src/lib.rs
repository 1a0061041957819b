//! Marionette Transport - Wire protocol client for Firefox's Marionette server.
//!
//! This library implements the transport beneath a Marionette client:
//! the TCP session, length-prefixed framing, protocol version negotiation
//! and command/reply correlation. Command-specific helpers (navigation,
//! element lookup, scripting) build on [`Connection::send`].
//!
//! # Architecture
//!
//! Marionette speaks a synchronous command/reply protocol:
//!
//! - **Greeting**: the server announces its protocol version on accept
//! - **Dialects**: version 2 sends `{"name", "parameters"}` objects,
//!   version 3 sends `[0, id, name, params]` arrays
//! - **Replies**: a success value or a [`DriverError`] from the server
//!
//! Key design principles:
//!
//! - One command in flight per [`Connection`] (`send` takes `&mut self`)
//! - Dialect fixed once per connection, from the greeting
//! - Remote failures ([`Error::Driver`]) are distinct from transport failures
//!
//! # Quick Start
//!
//! ```no_run
//! use marionette_transport::{Connection, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut connection = Connection::connect("127.0.0.1", 2828).await?;
//!
//!     connection
//!         .send("WebDriver:NewSession", json!({"capabilities": {}}))
//!         .await?;
//!     println!("Session: {:?}", connection.session_id());
//!
//!     let title = connection.send("WebDriver:GetTitle", json!({})).await?;
//!     println!("Title: {}", title.get_string("value"));
//!
//!     connection.close().await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Greeting, commands, replies, dialects |
//! | [`session`] | Session id and capabilities |
//! | [`transport`] | Framing and the TCP connection |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for protocol entities.
pub mod identifiers;

/// Marionette protocol message types.
///
/// Greeting parsing, command encoding and reply decoding for both dialects.
pub mod protocol;

/// Session state learned from the server.
pub mod session;

/// TCP transport layer.
///
/// Framing, handshake and the command round trip.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{MessageId, SessionId};

// Protocol types
pub use protocol::{
    Command, Dialect, DriverError, Greeting, Outcome, ProtocolVersion, RawResponse, Response,
};

// Session types
pub use session::{Capabilities, Session};

// Transport types
pub use transport::{Connection, ConnectionOptions, TcpTransport, Transport};
