//! Server greeting and protocol version negotiation.
//!
//! The remote end sends one unsolicited frame as soon as the TCP
//! connection is accepted:
//!
//! ```json
//! {"applicationType": "gecko", "marionetteProtocol": 3}
//! ```
//!
//! The announced version fixes the wire dialect for the whole connection.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};

// ============================================================================
// ProtocolVersion
// ============================================================================

/// Supported protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    /// Object-form commands, unenveloped replies.
    V2,
    /// Array-form commands with message ids.
    V3,
}

impl ProtocolVersion {
    /// Maps an announced version number onto a supported version.
    #[inline]
    #[must_use]
    pub const fn from_announced(version: u64) -> Option<Self> {
        match version {
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            _ => None,
        }
    }

    /// Returns the version number as announced on the wire.
    #[inline]
    #[must_use]
    pub const fn number(self) -> u64 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ============================================================================
// Greeting
// ============================================================================

/// Greeting frame contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    /// Application behind the server (`gecko` for Firefox).
    pub application_type: String,
    /// Negotiated protocol version.
    pub protocol_version: ProtocolVersion,
}

/// Wire shape of the greeting. Extra fields are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGreeting {
    application_type: String,
    marionette_protocol: u64,
}

impl Greeting {
    /// Parses a greeting frame payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the payload is not a greeting or
    /// announces an unsupported version.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let wire: WireGreeting = serde_json::from_slice(payload)
            .map_err(|e| Error::protocol(format!("malformed greeting: {e}")))?;

        let protocol_version = ProtocolVersion::from_announced(wire.marionette_protocol)
            .ok_or_else(|| {
                Error::protocol(format!(
                    "unsupported protocol version {}",
                    wire.marionette_protocol
                ))
            })?;

        Ok(Self {
            application_type: wire.application_type,
            protocol_version,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
