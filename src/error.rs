//! Error types for the Marionette transport.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use marionette_transport::{Connection, Result};
//! use serde_json::json;
//!
//! async fn example(connection: &mut Connection<tokio::net::TcpStream>) -> Result<()> {
//!     let response = connection.send("get", json!({"url": "https://example.com"})).await?;
//!     println!("{}", response.value);
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`], [`Error::ConnectionUnusable`], [`Error::NotConnected`] |
//! | Protocol | [`Error::Protocol`], [`Error::UnexpectedMessageId`] |
//! | Framing | [`Error::Frame`] |
//! | Execution | [`Error::RequestTimeout`] |
//! | Remote | [`Error::Driver`] |
//! | External | [`Error::Io`], [`Error::Json`] |
//!
//! [`Error::Driver`] is the only variant that leaves the channel healthy:
//! the remote end understood the command and refused or failed it.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::MessageId;
use crate::protocol::DriverError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when connection options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// TCP dial failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Dial did not complete within the configured deadline.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Remote end closed the socket between frames.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Connection can no longer carry commands.
    ///
    /// Returned after an earlier transport failure, or when a previous
    /// `send` was abandoned before its reply was read.
    #[error("Connection unusable: {reason}")]
    ConnectionUnusable {
        /// Why the connection was given up on.
        reason: String,
    },

    /// Command sent on a transport that never connected.
    #[error("Not connected")]
    NotConnected,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected message.
    ///
    /// Returned for malformed or unsupported greetings and for replies
    /// that do not follow the negotiated dialect.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Reply carried a message id other than the outstanding command's.
    #[error("Protocol error: expected reply to message {expected}, received {received}")]
    UnexpectedMessageId {
        /// Id of the command in flight.
        expected: MessageId,
        /// Id echoed by the remote end.
        received: MessageId,
    },

    // ========================================================================
    // Framing Errors
    // ========================================================================
    /// Malformed or truncated length-prefixed frame.
    #[error("Frame error: {message}")]
    Frame {
        /// Description of the framing failure.
        message: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Reply not received within the configured read deadline.
    #[error("Command {command} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// Name of the command (or `handshake`).
        command: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// Remote end rejected or failed the command.
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a connection unusable error.
    #[inline]
    pub fn connection_unusable(reason: impl Into<String>) -> Self {
        Self::ConnectionUnusable {
            reason: reason.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a message id mismatch error.
    #[inline]
    pub fn unexpected_message_id(expected: MessageId, received: MessageId) -> Self {
        Self::UnexpectedMessageId { expected, received }
    }

    /// Creates a frame error.
    #[inline]
    pub fn frame(message: impl Into<String>) -> Self {
        Self::Frame {
            message: message.into(),
        }
    }

    /// Creates a frame error for a payload cut short by EOF.
    #[inline]
    pub fn truncated_frame(received: usize, expected: usize) -> Self {
        Self::frame(format!(
            "connection closed after {received} of {expected} payload bytes"
        ))
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(command: impl Into<String>, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            command: command.into(),
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::ConnectionUnusable { .. }
                | Self::NotConnected
        )
    }

    /// Returns `true` if this is a protocol error.
    #[inline]
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::Protocol { .. } | Self::UnexpectedMessageId { .. }
        )
    }

    /// Returns `true` if this is a framing error.
    #[inline]
    #[must_use]
    pub fn is_frame_error(&self) -> bool {
        matches!(self, Self::Frame { .. })
    }

    /// Returns `true` if the remote end reported a command failure.
    #[inline]
    #[must_use]
    pub fn is_driver_error(&self) -> bool {
        matches!(self, Self::Driver(_))
    }

    /// Returns the remote failure, if this is one.
    #[inline]
    #[must_use]
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::Driver(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Only driver errors leave the session usable for further commands.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.is_driver_error()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "Connection failed: failed to connect");
    }

    #[test]
    fn test_truncated_frame_display() {
        let err = Error::truncated_frame(5, 50);
        assert_eq!(
            err.to_string(),
            "Frame error: connection closed after 5 of 50 payload bytes"
        );
        assert!(err.is_frame_error());
    }

    #[test]
    fn test_unexpected_message_id_is_protocol_error() {
        let err = Error::unexpected_message_id(MessageId::new(3), MessageId::new(2));
        assert!(err.is_protocol_error());
        assert_eq!(
            err.to_string(),
            "Protocol error: expected reply to message 3, received 2"
        );
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::request_timeout("getTitle", 500);
        let other_err = Error::connection("test");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::connection_timeout(1000).is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::NotConnected.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_driver_error_is_recoverable() {
        let err: Error = DriverError::new("no such element", "Unable to locate element").into();

        assert!(err.is_driver_error());
        assert!(err.is_recoverable());
        assert_eq!(
            err.driver_error().map(|e| e.status.as_str()),
            Some("no such element")
        );
        assert!(!Error::frame("bad").is_recoverable());
        assert!(Error::frame("bad").driver_error().is_none());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }
}
