//! Session state learned from the remote end.
//!
//! The remote end assigns a session id and a capability map when
//! `newSession` succeeds. Both stay fixed until `deleteSession`.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value};

use crate::identifiers::SessionId;

// ============================================================================
// Capabilities
// ============================================================================

/// Capabilities negotiated for a session.
///
/// Values are booleans, numbers or strings in practice; anything else is
/// kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities(Map<String, Value>);

impl Capabilities {
    /// Wraps a capability map.
    #[inline]
    #[must_use]
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the raw value for a capability.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a boolean capability.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Returns a string capability.
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns an unsigned integer capability.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    /// Returns a numeric capability.
    #[inline]
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Returns the number of capabilities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no capabilities were reported.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all capabilities.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

// ============================================================================
// Session
// ============================================================================

/// Session bound to one connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    id: Option<SessionId>,
    capabilities: Capabilities,
}

impl Session {
    /// Returns the session id, if a session has been created.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&SessionId> {
        self.id.as_ref()
    }

    /// Returns the negotiated capabilities.
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns `true` if a session is active.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    /// Builds a session from a `newSession` reply value.
    ///
    /// Looks for `sessionId` and `capabilities` each at the top level, then
    /// under `value`. Returns `None` if no session id is present.
    #[must_use]
    pub fn from_new_session(value: &Value) -> Option<Self> {
        let id = lookup(value, "sessionId").and_then(Value::as_str)?;
        let capabilities = lookup(value, "capabilities")
            .and_then(Value::as_object)
            .cloned()
            .map(Capabilities::new)
            .unwrap_or_default();

        Some(Self {
            id: Some(SessionId::new(id)),
            capabilities,
        })
    }
}

/// Returns `key` from the top level of a reply, falling back to `value.key`.
fn lookup<'a>(reply: &'a Value, key: &str) -> Option<&'a Value> {
    reply
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| reply.get("value")?.get(key))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_default_session_is_inactive() {
        let session = Session::default();
        assert!(!session.is_active());
        assert!(session.id().is_none());
        assert!(session.capabilities().is_empty());
    }

    #[test]
    fn test_from_new_session_top_level() {
        let session = Session::from_new_session(&json!({
            "sessionId": "abc123",
            "value": {"sessionId": "abc123", "capabilities": {}}
        }))
        .expect("session");

        assert_eq!(session.id().map(SessionId::as_str), Some("abc123"));
    }

    #[test]
    fn test_from_new_session_id_top_level_capabilities_nested() {
        let session = Session::from_new_session(&json!({
            "sessionId": "abc123",
            "value": {"sessionId": "abc123", "capabilities": {"browserName": "firefox"}}
        }))
        .expect("session");

        assert_eq!(session.id().map(SessionId::as_str), Some("abc123"));
        assert_eq!(session.capabilities().len(), 1);
        assert_eq!(session.capabilities().get_str("browserName"), Some("firefox"));
    }

    #[test]
    fn test_from_new_session_top_level_capabilities_win() {
        let session = Session::from_new_session(&json!({
            "sessionId": "s-1",
            "capabilities": {"browserName": "firefox"},
            "value": {"capabilities": {"browserName": "other"}}
        }))
        .expect("session");

        assert_eq!(session.capabilities().get_str("browserName"), Some("firefox"));
    }

    #[test]
    fn test_from_new_session_nested_capabilities() {
        let session = Session::from_new_session(&json!({
            "value": {
                "sessionId": "f00",
                "capabilities": {
                    "browserName": "firefox",
                    "acceptInsecureCerts": false,
                    "moz:processID": 4242,
                    "moz:buildID": "20261001000000"
                }
            }
        }))
        .expect("session");

        let capabilities = session.capabilities();
        assert_eq!(capabilities.len(), 4);
        assert_eq!(capabilities.get_str("browserName"), Some("firefox"));
        assert_eq!(capabilities.get_bool("acceptInsecureCerts"), Some(false));
        assert_eq!(capabilities.get_u64("moz:processID"), Some(4242));
        assert_eq!(capabilities.get_f64("moz:processID"), Some(4242.0));
        assert_eq!(capabilities.get_str("missing"), None);
        assert_eq!(capabilities.iter().count(), 4);
    }

    #[test]
    fn test_from_new_session_without_id() {
        assert!(Session::from_new_session(&json!({"value": null})).is_none());
        assert!(Session::from_new_session(&json!({"sessionId": 12})).is_none());
        assert!(Session::from_new_session(&Value::Null).is_none());
    }
}
