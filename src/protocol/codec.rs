//! Wire dialects for commands and replies.
//!
//! # Legacy (protocol 2)
//!
//! ```text
//! command: {"name": "getTitle", "parameters": {...}}
//! reply:   {...}                                   (fields read directly)
//! error:   {"error": {"status": ..., "message": ..., "stacktrace": ...}}
//! ```
//!
//! # Current (protocol 3)
//!
//! ```text
//! command: [0, <id>, "getTitle", {...}]
//! reply:   [1, <id>, <error|null>, <value|null>]
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::identifiers::MessageId;

use super::handshake::ProtocolVersion;
use super::{Command, DriverError, Outcome, RawResponse};

// ============================================================================
// Constants
// ============================================================================

/// Type tag of a current-dialect command.
const COMMAND_TAG: u8 = 0;

/// Type tag of a current-dialect reply.
const RESPONSE_TAG: u64 = 1;

// ============================================================================
// Dialect
// ============================================================================

/// Command/reply encoding, fixed per connection by the greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Object-form commands, unenveloped replies.
    Legacy,
    /// Array-form commands and replies correlated by message id.
    Current,
}

impl From<ProtocolVersion> for Dialect {
    fn from(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::V2 => Self::Legacy,
            ProtocolVersion::V3 => Self::Current,
        }
    }
}

impl Dialect {
    /// Returns `true` if commands carry message ids.
    #[inline]
    #[must_use]
    pub const fn uses_message_ids(self) -> bool {
        matches!(self, Self::Current)
    }

    /// Serializes a command into a frame payload.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if a current-dialect command has no message id
    /// - [`Error::Json`] if serialization fails
    pub fn encode(self, command: &Command) -> Result<Vec<u8>> {
        match self {
            Self::Legacy => encode_legacy(command),
            Self::Current => encode_current(command),
        }
    }

    /// Parses a reply frame payload.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the payload does not have the dialect's shape
    /// - [`Error::Protocol`] if a current-dialect message is not a reply
    pub fn decode(self, payload: &[u8]) -> Result<RawResponse> {
        match self {
            Self::Legacy => decode_legacy(payload),
            Self::Current => decode_current(payload),
        }
    }
}

// ============================================================================
// Legacy Dialect
// ============================================================================

#[derive(Serialize)]
struct LegacyCommand<'a> {
    name: &'a str,
    parameters: &'a Value,
}

fn encode_legacy(command: &Command) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&LegacyCommand {
        name: &command.name,
        parameters: &command.params,
    })?)
}

fn decode_legacy(payload: &[u8]) -> Result<RawResponse> {
    let body: Map<String, Value> = serde_json::from_slice(payload)?;

    let outcome = match body.get("error") {
        None | Some(Value::Null) => Outcome::Success(Value::Object(body)),
        Some(Value::Object(nested)) => Outcome::Failure(DriverError::from_payload(nested)),
        // Flat shape: {"error": "<code>", "message": ..., "stacktrace": ...}
        Some(_) => Outcome::Failure(DriverError::from_payload(&body)),
    };

    Ok(RawResponse {
        message_id: None,
        outcome,
        size: payload.len(),
    })
}

// ============================================================================
// Current Dialect
// ============================================================================

fn encode_current(command: &Command) -> Result<Vec<u8>> {
    let id = command.id.ok_or_else(|| {
        Error::protocol(format!("command {} has no message id", command.name))
    })?;

    Ok(serde_json::to_vec(&(
        COMMAND_TAG,
        id,
        &command.name,
        &command.params,
    ))?)
}

fn decode_current(payload: &[u8]) -> Result<RawResponse> {
    let (tag, id, error, value): (u64, MessageId, Value, Value) =
        serde_json::from_slice(payload)?;

    if tag != RESPONSE_TAG {
        return Err(Error::protocol(format!(
            "expected reply (type {RESPONSE_TAG}), received message type {tag}"
        )));
    }

    let outcome = match error {
        Value::Null => Outcome::Success(value),
        Value::Object(map) => Outcome::Failure(DriverError::from_payload(&map)),
        other => {
            let status = match other {
                Value::String(s) => s,
                scalar => scalar.to_string(),
            };
            Outcome::Failure(DriverError::new(status.clone(), status))
        }
    };

    Ok(RawResponse {
        message_id: Some(id),
        outcome,
        size: payload.len(),
    })
}

// ============================================================================
// Tests
// ============================================================================
