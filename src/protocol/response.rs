//! Reply records and remote error translation.
//!
//! A decoded reply is a [`RawResponse`]: either a success value or a
//! [`DriverError`] reported by the remote end. [`RawResponse::into_result`]
//! turns it into the [`Response`] envelope handed to callers, or into
//! [`Error::Driver`].

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::identifiers::MessageId;

/// Status used when the remote error payload names none.
const UNKNOWN_STATUS: &str = "unknown error";

// ============================================================================
// DriverError
// ============================================================================

/// Failure reported by the remote end for a single command.
///
/// Fields are copied verbatim from the remote error payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct DriverError {
    /// Error code, e.g. `no such element`.
    pub status: String,
    /// Human-readable description.
    pub message: String,
    /// Remote stack trace, if one was sent.
    pub stacktrace: Option<String>,
}

impl DriverError {
    /// Creates a driver error without a stack trace.
    #[inline]
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
            stacktrace: None,
        }
    }

    /// Builds a driver error from a remote error object.
    ///
    /// The status is read from `status` or `error`, as a string or a
    /// number. A missing message falls back to the status.
    #[must_use]
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        let status = ["status", "error"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(scalar_to_string))
            .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

        let message = payload
            .get("message")
            .and_then(scalar_to_string)
            .unwrap_or_else(|| status.clone());

        let stacktrace = payload
            .get("stacktrace")
            .and_then(scalar_to_string)
            .filter(|trace| !trace.is_empty());

        Self {
            status,
            message,
            stacktrace,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// RawResponse
// ============================================================================

/// Result of a single command as reported by the remote end.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Command succeeded with this value.
    Success(Value),
    /// Command failed remotely.
    Failure(DriverError),
}

/// Decoded reply frame, before error translation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// Echoed message id (current dialect only).
    pub message_id: Option<MessageId>,
    /// Success value or remote failure.
    pub outcome: Outcome,
    /// Payload size of the reply frame in bytes.
    pub size: usize,
}

impl RawResponse {
    /// Returns `true` if the remote end reported success.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Returns the remote failure, if any.
    #[inline]
    #[must_use]
    pub fn driver_error(&self) -> Option<&DriverError> {
        match &self.outcome {
            Outcome::Failure(err) => Some(err),
            Outcome::Success(_) => None,
        }
    }

    /// Splits the reply into a success envelope or a driver error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Driver`] if the remote end reported a failure.
    pub fn into_result(self) -> Result<Response> {
        match self.outcome {
            Outcome::Success(value) => Ok(Response {
                message_id: self.message_id,
                value,
                size: self.size,
            }),
            Outcome::Failure(err) => Err(Error::Driver(err)),
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// Successful reply handed back to the caller.
///
/// The value is left untouched for the caller to interpret.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Echoed message id (current dialect only).
    pub message_id: Option<MessageId>,
    /// Raw success value.
    pub value: Value,
    /// Payload size of the reply frame in bytes.
    pub size: usize,
}

impl Response {
    /// Returns the message id, or zero under the legacy dialect.
    #[inline]
    #[must_use]
    pub fn message_id_or_zero(&self) -> u32 {
        self.message_id.map_or(0, MessageId::get)
    }

    /// Deserializes the value into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the value does not match `T`.
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.value)?)
    }

    /// Gets a string value from the result.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.value
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a u64 value from the result.
    ///
    /// Returns 0 if key not found or not a number.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> u64 {
        self.value
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or_default()
    }

    /// Gets a boolean value from the result.
    ///
    /// Returns false if key not found or not a boolean.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.value
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
