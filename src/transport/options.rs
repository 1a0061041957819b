//! Connection configuration.
//!
//! The wire protocol has no deadlines of its own; a silent remote end
//! blocks a command forever unless a read timeout is configured here.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use marionette_transport::ConnectionOptions;
//!
//! let options = ConnectionOptions::new()
//!     .with_connect_timeout(Duration::from_secs(5))
//!     .with_read_timeout(Duration::from_secs(60))
//!     .with_max_frame_size(64 * 1024 * 1024);
//!
//! options.validate()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default largest accepted frame payload (256 MiB).
///
/// Full-page screenshots arrive as a single base64 frame.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 256 * 1024 * 1024;

/// Default id of the first command on a connection.
pub const DEFAULT_INITIAL_MESSAGE_ID: u32 = 1;

// ============================================================================
// ConnectionOptions
// ============================================================================

/// Per-connection transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Deadline for the TCP dial.
    pub connect_timeout: Option<Duration>,

    /// Deadline for reading the greeting and each reply.
    pub read_timeout: Option<Duration>,

    /// Largest frame payload accepted from the remote end.
    pub max_frame_size: usize,

    /// Message id of the first current-dialect command.
    pub initial_message_id: u32,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ConnectionOptions {
    /// Creates options with no deadlines and default limits.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: None,
            read_timeout: None,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            initial_message_id: DEFAULT_INITIAL_MESSAGE_ID,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ConnectionOptions {
    /// Sets the dial deadline.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the greeting and reply read deadline.
    #[inline]
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Sets the largest accepted frame payload.
    #[inline]
    #[must_use]
    pub fn with_max_frame_size(mut self, bytes: usize) -> Self {
        self.max_frame_size = bytes;
        self
    }

    /// Sets the id of the first command.
    #[inline]
    #[must_use]
    pub fn with_initial_message_id(mut self, id: u32) -> Self {
        self.initial_message_id = id;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ConnectionOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.initial_message_id == 0 {
            return Err(Error::config("Initial message id must be greater than zero"));
        }

        if self.max_frame_size == 0 {
            return Err(Error::config("Maximum frame size must be greater than zero"));
        }

        for (name, timeout) in [
            ("Connect", self.connect_timeout),
            ("Read", self.read_timeout),
        ] {
            if timeout.is_some_and(|t| t.is_zero()) {
                return Err(Error::config(format!(
                    "{name} timeout must be greater than zero"
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_default() {
        let options = ConnectionOptions::new();
        assert!(options.connect_timeout.is_none());
        assert!(options.read_timeout.is_none());
        assert_eq!(options.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(options.initial_message_id, 1);
        assert_eq!(options, ConnectionOptions::default());
    }

    #[test]
    fn test_builder_chain() {
        let options = ConnectionOptions::new()
            .with_connect_timeout(Duration::from_secs(5))
            .with_read_timeout(Duration::from_millis(250))
            .with_max_frame_size(1024)
            .with_initial_message_id(100);

        assert_eq!(options.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.read_timeout, Some(Duration::from_millis(250)));
        assert_eq!(options.max_frame_size, 1024);
        assert_eq!(options.initial_message_id, 100);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_message_id() {
        let err = ConnectionOptions::new()
            .with_initial_message_id(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_validate_zero_frame_size() {
        let options = ConnectionOptions::new().with_max_frame_size(0);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let options = ConnectionOptions::new().with_read_timeout(Duration::ZERO);
        assert_eq!(
            options.validate().unwrap_err().to_string(),
            "Configuration error: Read timeout must be greater than zero"
        );

        let options = ConnectionOptions::new().with_connect_timeout(Duration::ZERO);
        assert!(options.validate().is_err());
    }
}
