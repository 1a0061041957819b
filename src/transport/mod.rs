//! TCP transport layer.
//!
//! This module owns the socket: framing, the greeting handshake and the
//! synchronous command/reply exchange.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client (Rust)  │                              │  Marionette     │
//! │                 │      length-prefixed JSON    │  (Firefox)      │
//! │  Connection     │◄────────────────────────────►│                 │
//! │                 │       localhost:2828         │  TCP server     │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::connect` - Dial the server
//! 2. Read the greeting frame, pick the dialect
//! 3. `Connection::send` - One command, one reply, repeat
//! 4. `Connection::close` - Shut down the socket (also on drop)
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Handshake and command round trip |
//! | `frame` | Length-prefixed framing |
//! | `options` | Deadlines and limits |
//! | `transporter` | `Transport` trait and TCP implementation |

// ============================================================================
// Submodules
// ============================================================================

/// Handshake and command round trip.
pub mod connection;

/// Length-prefixed framing.
pub mod frame;

/// Connection deadlines and limits.
pub mod options;

/// Transport trait for higher-level clients.
pub mod transporter;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use options::ConnectionOptions;
pub use transporter::{TcpTransport, Transport};
