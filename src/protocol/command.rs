//! Outgoing command record.
//!
//! A command is a name plus an arbitrary JSON parameter value. Under the
//! current dialect it also carries the message id allocated by the
//! connection; the legacy dialect ignores it.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::MessageId;

// ============================================================================
// Command
// ============================================================================

/// A command addressed to the remote end.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Correlation id (current dialect only).
    pub id: Option<MessageId>,
    /// Command name, e.g. `newSession`.
    pub name: String,
    /// Parameters, passed through as-is. `Null` for commands without any.
    pub params: Value,
}

impl Command {
    /// Creates a command without a message id.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, params: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            params,
        }
    }

    /// Creates a command from any serializable parameter type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the parameters cannot
    /// be represented as JSON.
    pub fn serialized<P>(name: impl Into<String>, params: &P) -> Result<Self>
    where
        P: Serialize + ?Sized,
    {
        Ok(Self::new(name, serde_json::to_value(params)?))
    }

    /// Attaches a message id.
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = Some(id);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
