//! Marionette protocol message types.
//!
//! This module defines the JSON payloads carried inside frames and the two
//! wire dialects that encode them.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | [`Greeting`] | Remote → Local | Announces the protocol version on accept |
//! | [`Command`] | Local → Remote | Named command with JSON parameters |
//! | [`RawResponse`] | Remote → Local | Success value or [`DriverError`] |
//!
//! The greeting's `marionetteProtocol` picks the [`Dialect`]:
//!
//! | Version | Dialect | Command form |
//! |---------|---------|--------------|
//! | 2 | [`Dialect::Legacy`] | `{"name": ..., "parameters": ...}` |
//! | 3 | [`Dialect::Current`] | `[0, id, name, params]` |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `codec` | Dialect encode/decode |
//! | `command` | Outgoing command record |
//! | `handshake` | Greeting and version negotiation |
//! | `response` | Reply records and error translation |

// ============================================================================
// Submodules
// ============================================================================

/// Dialect encode/decode.
pub mod codec;

/// Outgoing command record.
pub mod command;

/// Greeting and version negotiation.
pub mod handshake;

/// Reply records and error translation.
pub mod response;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::Dialect;
pub use command::Command;
pub use handshake::{Greeting, ProtocolVersion};
pub use response::{DriverError, Outcome, RawResponse, Response};
