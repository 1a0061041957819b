//! Type-safe identifiers for protocol entities.
//!
//! Newtype wrappers keep message ids and session ids from being mixed
//! up with plain integers and strings.
//!
//! | Type | Wire form | Assigned by |
//! |------|-----------|-------------|
//! | [`MessageId`] | unsigned integer | client, per connection |
//! | [`SessionId`] | opaque string | remote end, on `newSession` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// MessageId
// ============================================================================

/// Correlation id for current-dialect commands.
///
/// Strictly increasing for the lifetime of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u32);

impl MessageId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the id that follows this one, or `None` once exhausted.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SessionId
// ============================================================================

/// Session identifier handed out by the remote end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a session id string.
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_next() {
        let id = MessageId::new(1);
        assert_eq!(id.next(), Some(MessageId::new(2)));
        assert!(id < MessageId::new(2));
    }

    #[test]
    fn test_message_id_exhausted() {
        assert_eq!(MessageId::new(u32::MAX).next(), None);
    }

    #[test]
    fn test_message_id_serializes_as_number() {
        let json = serde_json::to_string(&MessageId::new(7)).expect("serialize");
        assert_eq!(json, "7");
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(id.as_str(), "abc123");
    }
}
